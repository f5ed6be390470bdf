//! Remediation hints printed after a failed download.
//!
//! Hints are data: each rule names the failure kinds and source it applies to
//! and carries a template; `{target}`, `{var}` and `{family}` are filled in
//! when the rule is rendered.
use super::FailureKind;
use crate::layout::{CIVITAI_TOKEN_ENV, HF_TOKEN_ENV};
use crate::plan::{ModelFamily, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Hub,
    Http,
}

struct Rule {
    source: SourceKind,
    kinds: &'static [FailureKind],
    /// Only applies when no token was supplied.
    missing_token: bool,
    lines: &'static [&'static str],
}

const REMOTE_FAILURES: &[FailureKind] = &[
    FailureKind::Transfer,
    FailureKind::Unauthorized,
    FailureKind::Verification,
];

/// Every failure short of the user cancelling.
const ANY_FAILURE: &[FailureKind] = &[
    FailureKind::Setup,
    FailureKind::Transfer,
    FailureKind::Unauthorized,
    FailureKind::Verification,
    FailureKind::Io,
];

static RULES: &[Rule] = &[
    Rule {
        source: SourceKind::Hub,
        kinds: ANY_FAILURE,
        missing_token: false,
        lines: &[
            "NOTE: You may need to accept the model license at:",
            "  https://huggingface.co/{target}",
        ],
    },
    Rule {
        source: SourceKind::Hub,
        kinds: REMOTE_FAILURES,
        missing_token: true,
        lines: &[
            "TIP: Set {var} environment variable with your HuggingFace token:",
            "  export {var}=hf_your_token_here",
            "  comfy-prep download {family}",
        ],
    },
    Rule {
        source: SourceKind::Http,
        kinds: REMOTE_FAILURES,
        missing_token: true,
        lines: &[
            "TIP: Some CivitAI models require authentication.",
            "Set {var} environment variable:",
            "  export {var}=your_token_here",
            "  comfy-prep download {family}",
            "",
            "Get your API token from: https://civitai.com/user/account",
        ],
    },
    Rule {
        source: SourceKind::Http,
        kinds: &[FailureKind::Unauthorized],
        missing_token: false,
        lines: &["Check that {var} is still valid: https://civitai.com/user/account"],
    },
    Rule {
        source: SourceKind::Http,
        kinds: &[FailureKind::Setup],
        missing_token: false,
        lines: &[
            "TIP: Install curl or point COMFY_PREP_FETCH_COMMAND at another",
            "HTTP client that accepts curl-style arguments.",
        ],
    },
];

/// Render every hint that applies to a failure, rules separated by a blank line.
pub fn hints(
    kind: FailureKind,
    source: &Source,
    family: ModelFamily,
    token_present: bool,
) -> Vec<String> {
    let (source_kind, target, var) = match source {
        Source::Hub { repo_id } => (SourceKind::Hub, *repo_id, HF_TOKEN_ENV),
        Source::Http { url } => (SourceKind::Http, *url, CIVITAI_TOKEN_ENV),
    };
    let mut out = Vec::new();
    for rule in RULES {
        if rule.source != source_kind || !rule.kinds.contains(&kind) {
            continue;
        }
        if rule.missing_token && token_present {
            continue;
        }
        if !out.is_empty() {
            out.push(String::new());
        }
        out.extend(rule.lines.iter().map(|line| {
            line.replace("{target}", target)
                .replace("{var}", var)
                .replace("{family}", family.key())
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLUX: Source = Source::Hub {
        repo_id: "black-forest-labs/FLUX.1-dev",
    };
    const CIVITAI: Source = Source::Http {
        url: "https://civitai.com/api/download/models/361593",
    };

    #[test]
    fn hub_failure_without_token_mentions_license_and_variable() {
        let lines = hints(FailureKind::Transfer, &FLUX, ModelFamily::Flux, false);
        assert!(lines.contains(&"  https://huggingface.co/black-forest-labs/FLUX.1-dev".to_string()));
        assert!(lines.contains(&"  export HF_TOKEN=hf_your_token_here".to_string()));
        assert!(lines.contains(&"  comfy-prep download flux".to_string()));
    }

    #[test]
    fn hub_failure_with_token_only_mentions_license() {
        let lines = hints(FailureKind::Unauthorized, &FLUX, ModelFamily::Flux, true);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("NOTE:"));
    }

    #[test]
    fn local_hub_failures_still_mention_license() {
        for kind in [FailureKind::Setup, FailureKind::Io] {
            let lines = hints(kind, &FLUX, ModelFamily::Flux, true);
            assert_eq!(
                lines,
                vec![
                    "NOTE: You may need to accept the model license at:".to_string(),
                    "  https://huggingface.co/black-forest-labs/FLUX.1-dev".to_string(),
                ]
            );
        }
    }

    #[test]
    fn civitai_failure_points_at_account_page() {
        let lines = hints(
            FailureKind::Verification,
            &CIVITAI,
            ModelFamily::SdxlLightning,
            false,
        );
        assert!(lines.contains(&"  export CIVITAI_TOKEN=your_token_here".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.contains("https://civitai.com/user/account")));
    }

    #[test]
    fn cancellation_has_no_hints() {
        assert!(hints(FailureKind::Cancelled, &CIVITAI, ModelFamily::SdxlLightning, false).is_empty());
        assert!(hints(FailureKind::Cancelled, &FLUX, ModelFamily::Flux, false).is_empty());
    }
}

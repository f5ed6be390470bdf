use std::io::{self, BufRead, Write};
use std::path::Path;

/// Ask before replacing `path`. Only `y`/`Y` accepts; EOF declines.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    path: &Path,
) -> io::Result<bool> {
    writeln!(output, "⚠️  File already exists: {}", path.display())?;
    write!(output, "Overwrite? (y/N): ")?;
    output.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str) -> (bool, String) {
        let mut input = answer.as_bytes();
        let mut output = Vec::new();
        let accepted = confirm_overwrite(&mut input, &mut output, Path::new("/m/model.safetensors"))
            .expect("prompt");
        (accepted, String::from_utf8(output).expect("utf8"))
    }

    #[test]
    fn only_y_accepts() {
        assert!(ask("y\n").0);
        assert!(ask("Y\n").0);
        assert!(!ask("yes\n").0);
        assert!(!ask("\n").0);
        assert!(!ask("").0);
    }

    #[test]
    fn prompt_names_the_file() {
        let (_, text) = ask("n\n");
        assert!(text.starts_with("⚠️  File already exists: /m/model.safetensors\n"));
        assert!(text.ends_with("Overwrite? (y/N): "));
    }
}

use crate::domain::model::{Matching, Registry};
use crate::domain::ports::Confirmation;
use crate::utils::error::Result;
use std::io::{BufRead, Write};

/// Asks the operator on the terminal before anything is sent.
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, registry: &Registry, matching: &Matching) -> Result<bool> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        prompt(registry, matching, &mut stdin.lock(), &mut stdout.lock())
    }
}

/// Passes unconditionally (`--yes`, dry runs).
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&self, registry: &Registry, matching: &Matching) -> Result<bool> {
        tracing::debug!(
            "Auto-confirmed dispatch of {} assignments for {} participants",
            matching.len(),
            registry.len()
        );
        Ok(true)
    }
}

fn prompt<R: BufRead, W: Write>(
    registry: &Registry,
    matching: &Matching,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    writeln!(
        output,
        "WARNING: This is about to send {} messages to everyone in the exchange ({} participants). \
         Make sure you have permission to contact all of them.",
        matching.len(),
        registry.len()
    )?;
    writeln!(output)?;
    writeln!(output, "To continue press enter. To cancel type 'n' or press ctrl-c.")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        // 輸入已結束（非互動環境），視為取消
        writeln!(output, "No input available, cancelling.")?;
        return Ok(false);
    }
    let answer = line.trim().to_lowercase();
    Ok(!matches!(answer.as_str(), "n" | "no"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Participant;

    fn registry() -> Registry {
        Registry::new(vec![
            Participant::new("A", "a@example.com"),
            Participant::new("B", "b@example.com"),
        ])
        .unwrap()
    }

    #[test]
    fn test_enter_confirms() {
        let mut input = std::io::Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();
        assert!(prompt(&registry(), &Matching::new(), &mut input, &mut output).unwrap());
        assert!(String::from_utf8(output).unwrap().contains("WARNING"));
    }

    #[test]
    fn test_no_declines() {
        let mut input = std::io::Cursor::new(b"No\n".to_vec());
        let mut output = Vec::new();
        assert!(!prompt(&registry(), &Matching::new(), &mut input, &mut output).unwrap());
    }

    #[test]
    fn test_eof_declines() {
        let mut input = std::io::Cursor::new(Vec::new());
        let mut output = Vec::new();
        assert!(!prompt(&registry(), &Matching::new(), &mut input, &mut output).unwrap());
        assert!(String::from_utf8(output).unwrap().contains("cancelling"));
    }
}

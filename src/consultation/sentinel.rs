//! Terminal-reply detection
//!
//! The model has no structured output contract. A reply is terminal when it
//! contains the sentinel phrase, compared with ASCII case folding so byte
//! offsets stay valid for Devanagari or Telugu text around it.

/// Phrase the doctor emits to open the final prescription section
pub const SENTINEL: &str = "FINAL PRESCRIPTION";

/// Byte offset of the first sentinel occurrence, ignoring ASCII case
fn find_sentinel(reply: &str) -> Option<usize> {
    reply
        .to_ascii_lowercase()
        .find(&SENTINEL.to_ascii_lowercase())
}

/// Whether a doctor reply marks the end of the consultation
pub fn is_final_reply(reply: &str) -> bool {
    find_sentinel(reply).is_some()
}

/// Prescription body of a terminal reply.
///
/// Everything after the sentinel, trimmed. Text on the sentinel's own line is
/// kept once heading punctuation (`:`, `*`) is stripped. Falls back to the
/// whole trimmed reply when nothing follows the sentinel. Returns `None` for
/// non-terminal replies.
pub fn extract_prescription(reply: &str) -> Option<String> {
    let start = find_sentinel(reply)?;
    let after_sentinel = reply.get(start + SENTINEL.len()..)?;
    let (heading_rest, following) = after_sentinel
        .split_once('\n')
        .unwrap_or((after_sentinel, ""));

    let inline = heading_rest
        .trim_start_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
        .trim_end();
    let body = if inline.is_empty() {
        following.trim().to_string()
    } else {
        format!("{inline}\n{following}").trim().to_string()
    };

    if body.is_empty() {
        Some(reply.trim().to_string())
    } else {
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_detection() {
        assert!(is_final_reply("final prescription"));
        assert!(is_final_reply("Final Prescription"));
        assert!(is_final_reply("FINAL PRESCRIPTION"));
        assert!(is_final_reply("Here is your **Final Prescription**:\n- rest"));
    }

    #[test]
    fn test_partial_words_are_not_terminal() {
        assert!(!is_final_reply("final"));
        assert!(!is_final_reply("prescription"));
        assert!(!is_final_reply("Is this your final answer about the prescription?"));
        assert!(!is_final_reply("How high is your fever?"));
    }

    #[test]
    fn test_extract_drops_heading_line() {
        let reply = "FINAL PRESCRIPTION\n\nDiagnosis: viral fever\n\nMedicines: Paracetamol 500mg";
        assert_eq!(
            extract_prescription(reply).unwrap(),
            "Diagnosis: viral fever\n\nMedicines: Paracetamol 500mg"
        );
    }

    #[test]
    fn test_extract_drops_preamble() {
        let reply = "Thank you for the details.\n\n**Final Prescription**\n- Diagnosis: cold";
        assert_eq!(extract_prescription(reply).unwrap(), "- Diagnosis: cold");
    }

    #[test]
    fn test_extract_keeps_text_on_heading_line() {
        let reply =
            "FINAL PRESCRIPTION: Paracetamol 500mg twice daily for 3 days\nFollow up in one week";
        assert_eq!(
            extract_prescription(reply).unwrap(),
            "Paracetamol 500mg twice daily for 3 days\nFollow up in one week"
        );

        let bold = "**Final Prescription**: ORS after every loose stool";
        assert_eq!(extract_prescription(bold).unwrap(), "ORS after every loose stool");
    }

    #[test]
    fn test_extract_with_nothing_after_heading() {
        assert_eq!(
            extract_prescription("  FINAL PRESCRIPTION  ").unwrap(),
            "FINAL PRESCRIPTION"
        );
        assert!(extract_prescription("How long has it lasted?").is_none());
    }

    #[test]
    fn test_non_latin_text_around_sentinel() {
        let reply = "धन्यवाद। FINAL PRESCRIPTION\nनिदान: वायरल बुखार";
        assert!(is_final_reply(reply));
        assert_eq!(extract_prescription(reply).unwrap(), "निदान: वायरल बुखार");
    }
}

//! Reply-text extraction from responses-endpoint bodies.

use super::wire::WireResponse;
use courier_error::{CompletionError, CompletionErrorKind};

/// Pull the reply text out of a parsed response.
///
/// Prefers the consolidated `output_text` field when it is non-empty after
/// sanitization; otherwise concatenates every `output_text` fragment in
/// document order, dropping fragments that sanitize to nothing. The boolean
/// reports whether the fragment fallback was used. A response with no usable
/// text anywhere is a terminal empty-reply failure, never a blank string.
pub(crate) fn reply_text(response: &WireResponse) -> Result<(String, bool), CompletionError> {
    if let Some(consolidated) = &response.output_text {
        let clean = sanitize(consolidated);
        if !clean.trim().is_empty() {
            return Ok((clean, false));
        }
    }

    let mut fragments = Vec::new();
    for item in &response.output {
        for fragment in &item.content {
            if fragment.kind == "output_text" {
                let clean = sanitize(&fragment.text);
                if !clean.trim().is_empty() {
                    fragments.push(clean);
                }
            }
        }
    }

    if fragments.is_empty() {
        return Err(CompletionError::new(CompletionErrorKind::EmptyReply));
    }
    Ok((fragments.concat(), true))
}

/// Strip control characters, keeping newlines and tabs.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::wire::{WireFragment, WireOutputItem};

    fn fragment(text: &str) -> WireFragment {
        WireFragment {
            kind: "output_text".to_string(),
            text: text.to_string(),
        }
    }

    fn response_with_fragments(fragments: Vec<WireFragment>) -> WireResponse {
        WireResponse {
            id: Some("resp_test".to_string()),
            status: Some("completed".to_string()),
            output_text: None,
            output: vec![WireOutputItem {
                kind: "message".to_string(),
                content: fragments,
            }],
        }
    }

    #[test]
    fn consolidated_text_wins() {
        let response = WireResponse {
            id: None,
            status: None,
            output_text: Some("direct answer".to_string()),
            output: vec![WireOutputItem {
                kind: "message".to_string(),
                content: vec![fragment("ignored")],
            }],
        };
        let (text, used_fallback) = reply_text(&response).unwrap();
        assert_eq!(text, "direct answer");
        assert!(!used_fallback);
    }

    #[test]
    fn blank_consolidated_text_falls_back_to_fragments() {
        let mut response = response_with_fragments(vec![fragment("part one"), fragment(" part two")]);
        response.output_text = Some("  \u{0000} ".to_string());
        let (text, used_fallback) = reply_text(&response).unwrap();
        assert_eq!(text, "part one part two");
        assert!(used_fallback);
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let response =
            response_with_fragments(vec![fragment("  \u{0007}  "), fragment("kept")]);
        let (text, used_fallback) = reply_text(&response).unwrap();
        assert_eq!(text, "kept");
        assert!(used_fallback);
    }

    #[test]
    fn control_characters_are_stripped() {
        let response = WireResponse {
            id: None,
            status: None,
            output_text: Some("line one\nline\u{0008} two\tend".to_string()),
            output: Vec::new(),
        };
        let (text, _) = reply_text(&response).unwrap();
        assert_eq!(text, "line one\nline two\tend");
    }

    #[test]
    fn nothing_usable_is_a_terminal_failure() {
        let response = response_with_fragments(vec![fragment("   ")]);
        let err = reply_text(&response).unwrap_err();
        assert_eq!(err.kind, CompletionErrorKind::EmptyReply);
    }

    #[test]
    fn non_text_fragments_are_ignored() {
        let response = response_with_fragments(vec![
            WireFragment {
                kind: "refusal".to_string(),
                text: "refused".to_string(),
            },
            fragment("actual reply"),
        ]);
        let (text, _) = reply_text(&response).unwrap();
        assert_eq!(text, "actual reply");
    }
}

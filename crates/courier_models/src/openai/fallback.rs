//! Degraded-reply construction for overload conditions.

use courier_core::{CompletionReply, ReplyMetadata};

/// Locale-appropriate apology for a shed completion call.
///
/// Matched on the primary language subtag of the caller's locale hint.
fn overload_apology(locale_hint: Option<&str>) -> &'static str {
    let language = locale_hint
        .and_then(|hint| hint.split(['-', '_']).next())
        .map(str::to_ascii_lowercase);
    match language.as_deref() {
        Some("ru") => "Извини, я сейчас перегружен запросами. Попробуй ещё раз через минуту.",
        Some("es") => "Lo siento, ahora mismo estoy saturado de solicitudes. Inténtalo de nuevo en un minuto.",
        _ => "Sorry, I'm handling too many requests right now. Please try again in a minute.",
    }
}

/// The designed fallback for queue overflow.
///
/// An Ok value by construction: overload degrades the conversation, it never
/// breaks it.
pub(crate) fn degraded_reply(locale_hint: Option<&str>) -> CompletionReply {
    CompletionReply {
        text: overload_apology(locale_hint).to_string(),
        metadata: ReplyMetadata {
            degraded: true,
            reason: Some("queue_overflow".to_string()),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn russian_hint_gets_russian_apology() {
        let reply = degraded_reply(Some("ru-RU"));
        assert!(reply.text.starts_with("Извини"));
        assert!(reply.metadata.degraded);
        assert_eq!(reply.metadata.reason.as_deref(), Some("queue_overflow"));
    }

    #[test]
    fn unknown_hint_falls_back_to_english() {
        let reply = degraded_reply(Some("fr"));
        assert!(reply.text.starts_with("Sorry"));
    }

    #[test]
    fn missing_hint_falls_back_to_english() {
        let reply = degraded_reply(None);
        assert!(reply.text.starts_with("Sorry"));
    }
}

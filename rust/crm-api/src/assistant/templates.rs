//! Instruction templates per content type.

/// System instruction for a content type tag.
///
/// Unknown tags (including `custom`) fall back to the generic assistant
/// instruction, so the endpoint never rejects a content type outright.
#[must_use]
pub fn system_prompt(content_type: &str) -> &'static str {
    match content_type {
        "follow-up-email" => {
            "You are a professional business assistant. Generate a polite, professional \
             follow-up email that maintains good customer relationships. Keep it concise \
             and actionable."
        }
        "client-proposal" => {
            "You are a business proposal writer. Create compelling, professional proposals \
             that highlight value propositions and address client needs effectively."
        }
        "meeting-summary" => {
            "You are a meeting assistant. Create clear, organized meeting summaries with \
             action items, decisions made, and next steps."
        }
        "project-update" => {
            "You are a project manager. Generate clear, informative project updates that \
             communicate progress, challenges, and next steps to stakeholders."
        }
        "marketing-content" => {
            "You are a marketing content creator. Generate engaging, persuasive marketing \
             content that resonates with the target audience and drives action."
        }
        _ => {
            "You are a helpful business assistant. Generate professional, relevant content \
             based on the user's request."
        }
    }
}

/// User message combining optional context with the request itself.
#[must_use]
pub fn user_message(prompt: &str, context: Option<&str>) -> String {
    let context = match context {
        Some(c) if !c.trim().is_empty() => c,
        _ => "No additional context provided",
    };
    format!("Context: {context}\n\nRequest: {prompt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_get_specific_instructions() {
        assert!(system_prompt("follow-up-email").contains("follow-up email"));
        assert!(system_prompt("meeting-summary").contains("meeting summaries"));
    }

    #[test]
    fn custom_and_unknown_share_the_fallback() {
        assert_eq!(system_prompt("custom"), system_prompt("totally-new-tag"));
    }

    #[test]
    fn user_message_defaults_missing_context() {
        assert_eq!(
            user_message("Write an intro", None),
            "Context: No additional context provided\n\nRequest: Write an intro"
        );
        assert_eq!(
            user_message("Write an intro", Some("Client: Acme")),
            "Context: Client: Acme\n\nRequest: Write an intro"
        );
    }

    #[test]
    fn blank_context_counts_as_missing() {
        assert!(user_message("x", Some("   ")).starts_with("Context: No additional context"));
    }
}

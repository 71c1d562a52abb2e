//! Dialogue assembly. Pure functions: same inputs, same dialogue.

use crate::llm::{ChatMessage, Dialogue};
use crate::rag::{grounding_context, Match};

/// `system(context + every grounding match)`, `system(legal)`, `user(text)`.
pub fn build_initial_dialogue(
    system_context: &str,
    grounding_matches: &[Match],
    legal_context: &str,
    user_text: &str,
) -> Dialogue {
    Dialogue::from(vec![
        ChatMessage::system(grounding_context(
            system_context,
            grounding_matches,
            grounding_matches.len(),
        )),
        ChatMessage::system(legal_context),
        ChatMessage::user(user_text),
    ])
}

/// Copy of `dialogue` with the prior answer and a fresh system message appended.
pub fn append_follow_up(dialogue: &Dialogue, prior_answer: ChatMessage, new_context: String) -> Dialogue {
    let mut next = dialogue.clone();
    next.push(prior_answer);
    next.push(ChatMessage::system(new_context));
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use serde_json::json;

    fn prior_art(id: &str) -> Match {
        Match {
            id: id.to_string(),
            score: 0.9,
            metadata: json!({ "registration": format!("R-{}", id) })
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    #[test]
    fn initial_dialogue_orders_system_system_user() {
        let dialogue = build_initial_dialogue("TECH:", &[prior_art("P1")], "LAW", "my invention");
        assert_eq!(dialogue.roles(), vec![Role::System, Role::System, Role::User]);
        assert_eq!(dialogue.messages()[0].content, r#"TECH:{"registration":"R-P1"}"#);
        assert_eq!(dialogue.messages()[1].content, "LAW");
        assert_eq!(dialogue.messages()[2].content, "my invention");
    }

    #[test]
    fn initial_dialogue_embeds_every_available_match() {
        let matches: Vec<Match> = (1..=4).map(|i| prior_art(&format!("P{}", i))).collect();
        let dialogue = build_initial_dialogue("", &matches, "LAW", "x");
        for i in 1..=4 {
            assert!(dialogue.messages()[0].content.contains(&format!("R-P{}", i)));
        }

        let empty = build_initial_dialogue("TECH:", &[], "LAW", "x");
        assert_eq!(empty.messages()[0].content, "TECH:");
    }

    #[test]
    fn initial_dialogue_is_deterministic() {
        let matches = vec![prior_art("P1"), prior_art("P2")];
        let a = build_initial_dialogue("T", &matches, "L", "u");
        let b = build_initial_dialogue("T", &matches, "L", "u");
        assert_eq!(a, b);
    }

    #[test]
    fn follow_up_preserves_prior_messages_and_appends_two() {
        let initial = build_initial_dialogue("T", &[prior_art("P1")], "L", "u");
        let extended = append_follow_up(
            &initial,
            ChatMessage::assistant("tech answer"),
            "LAW + provisions".to_string(),
        );

        assert_eq!(initial.len(), 3);
        assert_eq!(extended.len(), 5);
        assert_eq!(&extended.messages()[..3], initial.messages());
        assert_eq!(extended.messages()[3], ChatMessage::assistant("tech answer"));
        assert_eq!(extended.messages()[4].role, Role::System);
        assert_eq!(extended.messages()[4].content, "LAW + provisions");
    }
}

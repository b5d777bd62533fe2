//! Built-in persona profiles.

use super::model::{PersonaKind, PersonaProfile};

fn profile(
    kind: PersonaKind,
    name: &str,
    greeting: &str,
    icon: &str,
    responses: [&str; 5],
) -> PersonaProfile {
    PersonaProfile {
        kind,
        name: name.to_string(),
        greeting: greeting.to_string(),
        icon: icon.to_string(),
        responses: responses.iter().map(|r| r.to_string()).collect(),
    }
}

/// Returns the default profile for every supported persona.
pub fn get_default_presets() -> Vec<PersonaProfile> {
    vec![
        profile(
            PersonaKind::Character,
            "귀여운 AI 친구",
            "안녕! 나는 너의 새로운 AI 친구야! 오늘 기분이 어때? 😊✨",
            "🥰",
            [
                "와! 정말 재미있는 이야기네! 더 들려줄래? 😊",
                "그런 일이 있었구나! 나도 비슷한 경험이 있어! ✨",
                "힘들었겠다... 괜찮아, 나는 항상 네 편이야! 💝",
                "오늘도 너무 수고했어! 정말 대단해! 🎉",
                "그렇게 생각하는구나! 나는 조금 다르게 생각해봤어! 🤔💭",
            ],
        ),
        profile(
            PersonaKind::Counselor,
            "AI 상담사",
            "안녕하세요. 저는 당신의 AI 상담사입니다. 어떤 고민이 있으신지 편안하게 말씀해 주세요.",
            "🤝",
            [
                "당신의 감정을 이해합니다. 이런 상황에서 그렇게 느끼는 것은 자연스러운 반응입니다.",
                "더 자세히 설명해 주시겠습니까? 구체적인 상황을 알면 더 나은 조언을 드릴 수 있습니다.",
                "이 문제에 대해 다양한 관점에서 접근해볼 수 있습니다. 먼저 근본적인 원인을 찾아보는 것이 중요합니다.",
                "당신의 강점을 활용해서 이 상황을 극복할 수 있을 것입니다. 과거에 비슷한 어려움을 어떻게 해결하셨나요?",
                "충분히 이해할 만한 상황입니다. 단계별로 해결책을 모색해보는 것이 좋겠습니다.",
            ],
        ),
        profile(
            PersonaKind::Tarot,
            "타로 마스터",
            "신비로운 타로의 세계에 오신 것을 환영합니다... 별들이 당신의 운명을 속삭이고 있어요. 🔮✨",
            "🔮",
            [
                "카드들이 당신의 에너지를 느끼고 있습니다... 타로 카드를 뽑아보시겠습니까? 🃏",
                "별들이 당신에게 중요한 메시지를 전하고 있어요... 운명의 카드를 선택해보세요 ✨",
                "신비로운 기운이 감지됩니다... 3장의 카드가 당신의 과거, 현재, 미래를 보여줄 것입니다 🔮",
                "우주의 에너지가 당신을 둘러싸고 있어요... 타로가 답을 알려줄 겁니다 🌟",
                "카드들이 속삭이고 있습니다... 당신의 질문에 대한 답을 찾아보겠습니다 🃏✨",
            ],
        ),
        profile(
            PersonaKind::Professional,
            "심리 상담 AI",
            "안녕하세요. 편안하게 대화해 보세요. 언제든지 말하고 싶은 것이 있으면 자유롭게 말씀해 주세요.",
            "💙",
            [
                "말씀해 주셔서 고맙습니다. 그런 기분이 드는 것은 충분히 이해할 수 있어요.",
                "천천히 말씀해 주세요. 어떤 것이든 괜찮습니다.",
                "지금 느끼고 계신 감정이 어떤 것인지 더 자세히 들려주실 수 있나요?",
                "힘든 시간을 보내고 계시는군요. 언제든 편안하게 이야기해 주세요.",
                "당신의 생각과 감정은 모두 소중합니다. 더 말씀해 주시겠어요?",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_has_exactly_one_valid_preset() {
        let presets = get_default_presets();
        assert_eq!(presets.len(), PersonaKind::all().len());

        for kind in PersonaKind::all() {
            let matching: Vec<_> = presets.iter().filter(|p| p.kind == kind).collect();
            assert_eq!(matching.len(), 1, "preset count for {}", kind);
            matching[0].validate().unwrap();
        }
    }

    #[test]
    fn test_response_tables_do_not_overlap() {
        let mut seen = HashSet::new();
        for preset in get_default_presets() {
            for response in &preset.responses {
                assert!(seen.insert(response.clone()), "duplicate: {}", response);
            }
        }
    }
}

//! Name and modifier tables for drinking characters.
//!
//! The first three code letters pick the character, the last two pick the
//! modifier placed in front of it ("自由な" + "賢者").

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::character_scorer::{CharacterCode, ScoringError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterName {
    pub value: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterModifier {
    pub value: &'static str,
    pub description: &'static str,
}

/// Display data for a resolved character code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CharacterProfile {
    pub code: String,
    pub name: String,
    pub description: String,
}

const CHARACTER_NAMES: [(&str, CharacterName); 8] = [
    (
        "EAC",
        CharacterName {
            value: "幹事長",
            description: "段取り上手で、誰よりも先に店を押さえてみんなを集めるまとめ役。強いお酒も涼しい顔で楽しみます。",
        },
    ),
    (
        "EAR",
        CharacterName {
            value: "盛り上げ隊長",
            description: "乾杯の音頭から締めの一杯まで、場の温度を上げ続けるムードメーカー。勢いのまま朝まで付き合ってくれます。",
        },
    ),
    (
        "EHC",
        CharacterName {
            value: "社交家",
            description: "誰とでもすぐ打ち解ける聞き上手。無理に飲まず、自分のペースで会話を楽しむタイプです。",
        },
    ),
    (
        "EHR",
        CharacterName {
            value: "冒険家",
            description: "知らない店や初めてのお酒にも臆せず飛び込む好奇心の塊。少量でも全力で楽しみます。",
        },
    ),
    (
        "IAC",
        CharacterName {
            value: "職人",
            description: "お気に入りの一杯をじっくり味わうこだわり派。少人数でお酒の話をするのが何より好きです。",
        },
    ),
    (
        "IAR",
        CharacterName {
            value: "一匹狼",
            description: "ふらりと一人で飲みに出かける自由人。強いお酒を片手に、気の向くまま夜を過ごします。",
        },
    ),
    (
        "IHC",
        CharacterName {
            value: "賢者",
            description: "静かな場所でゆっくり語り合うのが好きな落ち着き派。お酒は控えめでも、深い話で相手を惹きつけます。",
        },
    ),
    (
        "IHR",
        CharacterName {
            value: "夢想家",
            description: "気の合う相手と、のんびり思いつくままに語り合う空想家。雰囲気に酔うのが得意です。",
        },
    ),
];

const CHARACTER_MODIFIERS: [(&str, CharacterModifier); 4] = [
    (
        "NO",
        CharacterModifier {
            value: "自由な",
            description: "細かいことは気にせず、新しい出会いを楽しめるあなた。",
        },
    ),
    (
        "NS",
        CharacterModifier {
            value: "穏やかな",
            description: "いつもの場所でのんびり過ごすのが好きなあなた。",
        },
    ),
    (
        "TO",
        CharacterModifier {
            value: "情熱的な",
            description: "語り出したら止まらない、好奇心旺盛なあなた。",
        },
    ),
    (
        "TS",
        CharacterModifier {
            value: "几帳面な",
            description: "話の中身も店選びも、きちんとこだわるあなた。",
        },
    ),
];

pub fn name_for(front: &str) -> Option<CharacterName> {
    CHARACTER_NAMES
        .iter()
        .find(|(code, _)| *code == front)
        .map(|(_, name)| *name)
}

pub fn modifier_for(back: &str) -> Option<CharacterModifier> {
    CHARACTER_MODIFIERS
        .iter()
        .find(|(code, _)| *code == back)
        .map(|(_, modifier)| *modifier)
}

/// Look up both halves of `code`. A missing entry is an error, never a
/// fallback character.
pub fn resolve(code: &CharacterCode) -> Result<CharacterProfile, ScoringError> {
    let unknown = || ScoringError::UnknownCharacterCode {
        code: code.to_string(),
    };
    let name = name_for(&code.front()).ok_or_else(unknown)?;
    let modifier = modifier_for(&code.back()).ok_or_else(unknown)?;

    Ok(CharacterProfile {
        code: code.to_string(),
        name: format!("{}{}", modifier.value, name.value),
        description: format!("{}{}", modifier.description, name.description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_lookup() {
        assert_eq!(name_for("IHC").unwrap().value, "賢者");
        assert_eq!(modifier_for("NO").unwrap().value, "自由な");

        let profile = resolve(&"IHCNO".parse().unwrap()).unwrap();
        assert_eq!(profile.code, "IHCNO");
        assert_eq!(profile.name, "自由な賢者");
        assert!(profile.description.starts_with("細かいことは気にせず"));
        assert!(profile.description.ends_with("深い話で相手を惹きつけます。"));
    }

    #[test]
    fn test_every_producible_code_resolves() {
        let fronts = ['E', 'I']
            .into_iter()
            .flat_map(|a| ['A', 'H'].into_iter().map(move |b| (a, b)))
            .flat_map(|(a, b)| ['C', 'R'].into_iter().map(move |c| format!("{a}{b}{c}")))
            .collect::<Vec<_>>();
        let backs = ["NO", "NS", "TO", "TS"];
        assert_eq!(fronts.len(), 8);

        for front in &fronts {
            for back in backs {
                let code: CharacterCode = format!("{front}{back}").parse().unwrap();
                assert!(resolve(&code).is_ok(), "{code}");
            }
        }
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert!(name_for("ihc").is_none());
        assert!(name_for("IH").is_none());
        assert!(modifier_for("ON").is_none());
    }
}

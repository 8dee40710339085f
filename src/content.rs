use serde::Deserialize;

const PORTFOLIO_JSON: &str = include_str!("../config/portfolio.json");

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CounterItem {
    pub label: String,
    pub school: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SkillFace {
    pub label: String,
    pub background: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub counter_items: Vec<CounterItem>,
    #[serde(default)]
    pub cube_words: Vec<String>,
    #[serde(default)]
    pub skill_faces: Vec<SkillFace>,
}

impl Content {
    pub fn embedded() -> Result<Self, serde_json::Error> {
        Self::parse(PORTFOLIO_JSON)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_content_parses() {
        let content = Content::embedded().expect("embedded JSON is valid");
        assert!(!content.counter_items.is_empty());
        assert_eq!(content.cube_words.len(), 6);
        assert_eq!(content.skill_faces.len(), 6);
        assert_eq!(content.skill_faces[0].label, "Java");
        assert_eq!(content.skill_faces[0].background, "#5382a1");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let content = Content::parse(r#"{ "cubeWords": ["AI"] }"#).expect("partial JSON parses");
        assert_eq!(content.cube_words, vec!["AI".to_string()]);
        assert!(content.counter_items.is_empty());
        assert!(content.skill_faces.is_empty());
    }

    #[test]
    fn malformed_content_is_an_error() {
        assert!(Content::parse(r#"{ "counterItems": [{ "label": 3 }] }"#).is_err());
    }
}

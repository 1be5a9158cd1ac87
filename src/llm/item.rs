use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    ShortAnswer,
    DocumentBased,
    LongEssay,
}

impl ItemKind {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            ItemKind::ShortAnswer => "SAQ",
            ItemKind::DocumentBased => "DBQ",
            ItemKind::LongEssay => "LEQ",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ItemKind::ShortAnswer => "Short Answer Question",
            ItemKind::DocumentBased => "Document-Based Question",
            ItemKind::LongEssay => "Long Essay Question",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field `{0}` must not be empty")]
    Empty(&'static str),
    #[error("field `{0}` must be a positive integer")]
    NotPositive(&'static str),
    #[error("expected 4 options, got {0}")]
    OptionCount(usize),
    #[error("correct option index {0} is outside 0..=3")]
    CorrectOutOfRange(i64),
}

/// Deserializing goes through the same checks as model output, so a stored
/// question can never carry an out-of-range `correct`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ShortAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct: u8,
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct DocumentBased {
    pub prompt: String,
    pub documents: u32,
    pub points: u32,
    pub themes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct LongEssay {
    pub prompt: String,
    pub points: u32,
    pub themes: Vec<String>,
}

/// A fully validated model output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedItem {
    ShortAnswer(ShortAnswer),
    DocumentBased(DocumentBased),
    LongEssay(LongEssay),
}

impl GeneratedItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            GeneratedItem::ShortAnswer(_) => ItemKind::ShortAnswer,
            GeneratedItem::DocumentBased(_) => ItemKind::DocumentBased,
            GeneratedItem::LongEssay(_) => ItemKind::LongEssay,
        }
    }
}

/// The structural contract a parsed model response must satisfy for one kind.
pub trait ItemShape: Sized {
    const KIND: ItemKind;

    fn from_value(value: &Value) -> Result<Self, ShapeError>;

    fn into_item(self) -> GeneratedItem;
}

impl ItemShape for ShortAnswer {
    const KIND: ItemKind = ItemKind::ShortAnswer;

    fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let object = as_object(value)?;
        let question = non_empty_str(object, "question")?;

        let options = required(object, "options")?
            .as_array()
            .ok_or(ShapeError::WrongType {
                field: "options",
                expected: "a list of strings",
            })?;
        if options.len() != OPTION_COUNT {
            return Err(ShapeError::OptionCount(options.len()));
        }
        let options: Vec<String> = options
            .iter()
            .map(|option| {
                option.as_str().map(str::to_string).ok_or(ShapeError::WrongType {
                    field: "options",
                    expected: "a list of strings",
                })
            })
            .collect::<Result<_, _>>()?;
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|rest: Vec<String>| ShapeError::OptionCount(rest.len()))?;

        let correct = integer(object, "correct")?;
        if !(0..OPTION_COUNT as i64).contains(&correct) {
            return Err(ShapeError::CorrectOutOfRange(correct));
        }

        let feedback = non_empty_str(object, "feedback")?;

        Ok(Self {
            id: None,
            question,
            options,
            correct: correct as u8,
            feedback,
        })
    }

    fn into_item(self) -> GeneratedItem {
        GeneratedItem::ShortAnswer(self)
    }
}

impl ItemShape for DocumentBased {
    const KIND: ItemKind = ItemKind::DocumentBased;

    fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let object = as_object(value)?;
        Ok(Self {
            prompt: non_empty_str(object, "prompt")?,
            documents: positive(object, "documents")?,
            points: positive(object, "points")?,
            themes: themes(object)?,
        })
    }

    fn into_item(self) -> GeneratedItem {
        GeneratedItem::DocumentBased(self)
    }
}

impl ItemShape for LongEssay {
    const KIND: ItemKind = ItemKind::LongEssay;

    fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let object = as_object(value)?;
        Ok(Self {
            prompt: non_empty_str(object, "prompt")?,
            points: positive(object, "points")?,
            themes: themes(object)?,
        })
    }

    fn into_item(self) -> GeneratedItem {
        GeneratedItem::LongEssay(self)
    }
}

impl TryFrom<Value> for ShortAnswer {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut item = Self::from_value(&value)?;
        item.id = match value.get("id") {
            None | Some(Value::Null) => None,
            Some(id) => Some(
                id.as_str()
                    .ok_or(ShapeError::WrongType {
                        field: "id",
                        expected: "a string",
                    })?
                    .to_string(),
            ),
        };
        Ok(item)
    }
}

impl TryFrom<Value> for DocumentBased {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl TryFrom<Value> for LongEssay {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ShapeError> {
    value.as_object().ok_or(ShapeError::NotAnObject)
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ShapeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ShapeError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn non_empty_str(object: &Map<String, Value>, field: &'static str) -> Result<String, ShapeError> {
    let text = required(object, field)?
        .as_str()
        .ok_or(ShapeError::WrongType {
            field,
            expected: "a string",
        })?
        .trim();
    if text.is_empty() {
        return Err(ShapeError::Empty(field));
    }
    Ok(text.to_string())
}

fn integer(object: &Map<String, Value>, field: &'static str) -> Result<i64, ShapeError> {
    required(object, field)?
        .as_i64()
        .ok_or(ShapeError::WrongType {
            field,
            expected: "an integer",
        })
}

fn positive(object: &Map<String, Value>, field: &'static str) -> Result<u32, ShapeError> {
    let value = integer(object, field)?;
    u32::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(ShapeError::NotPositive(field))
}

// Themes are optional; when present they must be a list of strings.
fn themes(object: &Map<String, Value>) -> Result<Vec<String>, ShapeError> {
    let Some(value) = object.get("themes").filter(|value| !value.is_null()) else {
        return Ok(Vec::new());
    };
    let wrong_type = ShapeError::WrongType {
        field: "themes",
        expected: "a list of strings",
    };
    value
        .as_array()
        .ok_or(wrong_type.clone())?
        .iter()
        .map(|theme| theme.as_str().map(str::to_string).ok_or(wrong_type.clone()))
        .collect()
}

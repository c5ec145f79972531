use std::collections::HashMap;

const BASIC_RESPONSES: &[(&str, &str)] = &[
    ("hi", "Hello!"),
    ("hello", "Hi there!"),
    ("hey", "Hey!"),
    ("thanks", "You're welcome!"),
    ("thank you", "Glad to help!"),
    ("bye", "Goodbye!"),
    ("goodbye", "Take care!"),
    ("ok", "Alright."),
    ("okay", "Sure."),
    ("cool", "😎"),
    ("great", "Awesome!"),
];

const INSURANCE_KEYWORDS: &[&str] = &[
    "insurance",
    "policy",
    "premium",
    "coverage",
    "claim",
    "deductible",
    "beneficiary",
    "underwriting",
    "health insurance",
    "life insurance",
    "auto insurance",
    "home insurance",
    "financial protection",
    "risk",
];

/// Which step of the pipeline answers a message.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Empty,
    Basic(&'a str),
    OnTopic,
    OffTopic,
}

impl Route<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Empty => "empty",
            Route::Basic(_) => "basic",
            Route::OnTopic => "on_topic",
            Route::OffTopic => "off_topic",
        }
    }
}

/// Canned replies and the topic vocabulary. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PhraseTables {
    basic: HashMap<String, String>,
    keywords: Vec<String>,
}

impl Default for PhraseTables {
    fn default() -> Self {
        Self::new(
            BASIC_RESPONSES.iter().copied(),
            INSURANCE_KEYWORDS.iter().copied(),
        )
    }
}

impl PhraseTables {
    /// Keys and keywords are stored lowercased and trimmed.
    pub fn new<'a>(
        basic: impl IntoIterator<Item = (&'a str, &'a str)>,
        keywords: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let basic = basic
            .into_iter()
            .map(|(phrase, reply)| (phrase.trim().to_lowercase(), reply.to_owned()))
            .collect();
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { basic, keywords }
    }

    pub fn basic_reply(&self, message: &str) -> Option<&str> {
        self.basic
            .get(&message.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn is_on_topic(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }

    pub fn classify(&self, message: &str) -> Route<'_> {
        let message = message.trim();
        if message.is_empty() {
            return Route::Empty;
        }
        if let Some(reply) = self.basic_reply(message) {
            return Route::Basic(reply);
        }
        if self.is_on_topic(message) {
            Route::OnTopic
        } else {
            Route::OffTopic
        }
    }
}

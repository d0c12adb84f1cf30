use crate::error::FetchError;

pub const AUTHOR: &str = "Paul Graham";

/// Where the essay collection lives. Constructed once, read everywhere.
#[derive(Debug, Clone)]
pub struct EssaySource {
    pub base_url: String,
    pub articles_url: String,
}

impl Default for EssaySource {
    fn default() -> Self {
        Self {
            base_url: "https://paulgraham.com/".to_owned(),
            articles_url: "articles.html".to_owned(),
        }
    }
}

impl EssaySource {
    pub fn new(base_url: impl Into<String>, articles_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            articles_url: articles_url.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if !self.base_url.ends_with('/') {
            return Err(FetchError::Config(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn index_url(&self) -> String {
        format!("{}{}", self.base_url, self.articles_url)
    }
}

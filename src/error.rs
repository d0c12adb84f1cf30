use thiserror::Error;

/// Fatal errors for a fetch run. Anything that goes wrong while processing a
/// single essay is contained inside the item loop and never surfaces here.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Malformed source configuration; raised before any network activity.
    #[error("base url must end with a slash: {0}")]
    Config(String),

    /// Failed to build the HTTP client.
    #[error("build http client")]
    Client(#[source] reqwest::Error),

    /// Index page unreachable.
    #[error("fetch index page: {url}")]
    IndexRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Index page returned a non-success status.
    #[error("index page {url} returned status {status}")]
    IndexStatus { url: String, status: u16 },

    /// Could not prepare the output directory or the CSV index file.
    #[error("prepare output: {0}")]
    Io(#[from] std::io::Error),

    /// Could not write the CSV header.
    #[error("write csv index")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            FetchError::Config("http://example.com".to_owned()).to_string(),
            "base url must end with a slash: http://example.com"
        );
        assert_eq!(
            FetchError::IndexStatus {
                url: "http://example.com/articles.html".to_owned(),
                status: 404,
            }
            .to_string(),
            "index page http://example.com/articles.html returned status 404"
        );
    }
}

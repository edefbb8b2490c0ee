use std::time::Duration;

use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const PROJECT_EULER_URL: &str = "https://projecteuler.net";

const TITLE_SELECTOR: &str = "#content h2";
const BODY_SELECTOR: &str = "#content div.problem_content";

/// A problem page reduced to the pieces the site renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemContent {
    pub number: i64,
    pub title: String,
    pub body_html: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with {status}")]
    Status { url: String, status: StatusCode },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector {0}")]
    Selector(&'static str),
    #[error("no element matching {selector} in problem {number}")]
    MissingElement {
        number: i64,
        selector: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ProblemFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[async_trait]
pub trait ProblemFetcher: Send + Sync {
    /// Fetch and parse a single problem. One attempt, nothing cached.
    async fn fetch_problem(&self, number: i64) -> Result<ProblemContent, ProblemFetchError>;
}

#[derive(Debug, Clone, Builder)]
pub struct HttpProblemFetcher {
    #[builder(setter(into), default = "PROJECT_EULER_URL.to_string()")]
    base_url: String,
    #[builder(default = "Duration::from_secs(10)")]
    timeout: Duration,
    #[builder(default)]
    client: reqwest::Client,
}

impl HttpProblemFetcher {
    pub fn problem_url(&self, number: i64) -> String {
        get_url(&self.base_url, number)
    }
}

#[async_trait]
impl ProblemFetcher for HttpProblemFetcher {
    async fn fetch_problem(&self, number: i64) -> Result<ProblemContent, ProblemFetchError> {
        let url = self.problem_url(number);
        debug!(%url, "fetching problem page");

        let request_error = |source| FetchError::Request {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            }
            .into());
        }

        let html = response.text().await.map_err(request_error)?;
        Ok(parse_problem(number, &html)?)
    }
}

fn get_url(base_url: &str, number: i64) -> String {
    format!("{}/problem={}", base_url.trim_end_matches('/'), number)
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

pub fn parse_problem(number: i64, html: &str) -> Result<ProblemContent, ParseError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector(TITLE_SELECTOR)?)
        .next()
        .ok_or(ParseError::MissingElement {
            number,
            selector: TITLE_SELECTOR,
        })?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    let body_html = document
        .select(&selector(BODY_SELECTOR)?)
        .next()
        .ok_or(ParseError::MissingElement {
            number,
            selector: BODY_SELECTOR,
        })?
        .inner_html()
        .trim()
        .to_string();

    Ok(ProblemContent {
        number,
        title,
        body_html,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn parse_problem_should_work() {
        let content = fs::read_to_string("fixtures/problem_1.html").unwrap();
        let problem = parse_problem(1, &content).unwrap();

        assert_eq!(problem.number, 1);
        assert_eq!(problem.title, "Multiples of 3 or 5");
        insta::assert_snapshot!(problem.body_html, @r###"
        <p>If we list all the natural numbers below $10$ that are multiples of $3$ or $5$, we get $3, 5, 6$ and $9$. The sum of these multiples is $23$.</p>
        <p>Find the sum of all the multiples of $3$ or $5$ below $1000$.</p>
        "###);
    }

    #[test]
    fn parse_minimal_problem_should_work() {
        let html = r#"<html><body><div id="content"><h2>Problem 42</h2><div class="problem_content"><p>text</p></div></div></body></html>"#;
        let problem = parse_problem(42, html).unwrap();

        assert_eq!(
            problem,
            ProblemContent {
                number: 42,
                title: "Problem 42".to_string(),
                body_html: "<p>text</p>".to_string(),
            }
        );
    }

    #[test]
    fn missing_content_container_should_fail() {
        let html = r#"<html><body><div id="content"><h2>Problem 42</h2></div></body></html>"#;
        let err = parse_problem(42, html).unwrap_err();

        assert!(matches!(
            err,
            ParseError::MissingElement {
                number: 42,
                selector: BODY_SELECTOR
            }
        ));
    }

    #[test]
    fn missing_heading_should_fail() {
        let html = r#"<html><body><div id="content"><div class="problem_content"><p>text</p></div></div></body></html>"#;
        let err = parse_problem(7, html).unwrap_err();

        assert!(matches!(
            err,
            ParseError::MissingElement {
                selector: TITLE_SELECTOR,
                ..
            }
        ));
    }

    #[test]
    fn get_url_should_strip_trailing_slash() {
        assert_eq!(
            get_url("https://projecteuler.net/", 12),
            "https://projecteuler.net/problem=12"
        );
    }

    #[test]
    fn builder_should_default_to_project_euler() {
        let fetcher = HttpProblemFetcherBuilder::default().build().unwrap();
        assert_eq!(fetcher.problem_url(3), "https://projecteuler.net/problem=3");
    }
}

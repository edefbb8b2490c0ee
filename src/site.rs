use anyhow::Result;
use askama::Template;

/// The HTML shell served at `/`, with the API location baked in at startup.
#[derive(Debug, Template)]
#[template(path = "index.html.j2")]
pub struct IndexPage {
    pub title: String,
    pub api_url: String,
}

impl IndexPage {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            title: "Home".to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn generate(&self) -> Result<String> {
        Ok(self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_should_inject_api_url() {
        let html = IndexPage::new("https://api.example.com/").generate().unwrap();

        assert!(html.contains(r#"<meta name="api-url" content="https:"#));
        assert!(html.contains("api.example.com"));
        assert!(!html.contains("api.example.com/\""));
        assert!(html.contains("<title>Home</title>"));
    }

    #[test]
    fn generate_should_escape_api_url() {
        let html = IndexPage::new(r#"https://x.test/"><script>alert(1)</script>"#)
            .generate()
            .unwrap();

        assert!(html.contains("x.test"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(!html.contains(r#""><script>"#));
    }
}

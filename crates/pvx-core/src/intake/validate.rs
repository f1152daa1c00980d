use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("static regex")
});

static HOTEL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.tripadvisor\.[a-z.]{2,}/Hotel_Review-g\d+-d\d+-Reviews-[\w%][\w\-%]*\.html$")
        .expect("static regex")
});

static HOTEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-Reviews-([^-./]+)").expect("static regex"));

/// Checks applied to user input before a request is dispatched.
///
/// Implementations must be pure and total.
pub trait Validator: Send + Sync + 'static {
    fn is_valid_email(&self, email: &str) -> bool;
    fn is_valid_target_url(&self, url: &str) -> bool;
    /// Display name of the target; empty when the URL carries none.
    fn extract_target_name(&self, url: &str) -> String;
}

/// Validator for TripAdvisor hotel review pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripAdvisorValidator;

impl Validator for TripAdvisorValidator {
    fn is_valid_email(&self, email: &str) -> bool {
        EMAIL.is_match(email.trim())
    }

    fn is_valid_target_url(&self, url: &str) -> bool {
        HOTEL_URL.is_match(url.trim())
    }

    fn extract_target_name(&self, url: &str) -> String {
        HOTEL_NAME
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.tripadvisor.com/Hotel_Review-g188107-d231860-Reviews-Beau_Rivage_Palace-Lausanne_Canton_of_Vaud.html";

    #[test]
    fn emails() {
        let v = TripAdvisorValidator;
        assert!(v.is_valid_email("someone@example.com"));
        assert!(v.is_valid_email(" first.last+tag@sub.example.ch "));
        assert!(!v.is_valid_email("someone@"));
        assert!(!v.is_valid_email("no-at-sign.example.com"));
        assert!(!v.is_valid_email(""));
    }

    #[test]
    fn hotel_urls() {
        let v = TripAdvisorValidator;
        assert!(v.is_valid_target_url(URL));
        assert!(v.is_valid_target_url(
            "https://www.tripadvisor.co.uk/Hotel_Review-g1-d2-Reviews-Some_Inn-Town.html"
        ));
        assert!(!v.is_valid_target_url(
            "https://www.tripadvisor.com/Restaurant_Review-g1-d2-Reviews-X-Y.html"
        ));
        assert!(!v.is_valid_target_url("http://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews-X.html"));
        assert!(!v.is_valid_target_url("https://evil.test/Hotel_Review-g1-d2-Reviews-X.html"));
    }

    #[test]
    fn every_accepted_url_yields_a_name() {
        let v = TripAdvisorValidator;
        let dashed = "https://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews--X.html";
        assert!(!v.is_valid_target_url(dashed));
        assert_eq!(v.extract_target_name(dashed), "");

        for url in [
            URL,
            "https://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews-X.html",
            "https://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews-Caf%C3%A9-Bern.html",
        ] {
            assert!(v.is_valid_target_url(url), "{url}");
            assert!(!v.extract_target_name(url).is_empty(), "{url}");
        }
    }

    #[test]
    fn hotel_name_is_segment_after_reviews() {
        let v = TripAdvisorValidator;
        assert_eq!(v.extract_target_name(URL), "Beau_Rivage_Palace");
        assert_eq!(
            v.extract_target_name("https://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews-Solo.html"),
            "Solo"
        );
        assert_eq!(v.extract_target_name("https://www.tripadvisor.com/"), "");
    }
}

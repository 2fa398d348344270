//! restcountries.com client
//!
//! API: https://restcountries.com/v3.1/name/{country}?fullText=true
//! Free, no API key required

use reqwest::Url;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::CountryInfo;
use crate::providers::service_error;

pub struct CountriesClient {
    client: reqwest::Client,
    base_url: String,
}

impl CountriesClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Metadata for the country named exactly `country`
    pub async fn country_info(&self, country: &str) -> AppResult<CountryInfo> {
        let url = country_url(&self.base_url, country)?;

        info!("🌎 restcountries: fetching {}", country);

        let response = self
            .client
            .get(url)
            .query(&[("fullText", "true")])
            .send()
            .await
            .map_err(|e| service_error(ErrorCode::CountryService, "restcountries request failed", e))?;

        if !response.status().is_success() {
            warn!("restcountries error status: {}", response.status());
            return Err(AppError::from_code(ErrorCode::CountryService));
        }

        let countries: Vec<CountryInfo> = response
            .json()
            .await
            .map_err(|e| service_error(ErrorCode::CountryService, "can't decode restcountries response", e))?;

        countries.into_iter().next().ok_or_else(|| {
            warn!("restcountries returned no entry for {}", country);
            AppError::from_code(ErrorCode::CountryService)
        })
    }
}

/// `{base}/name/{country}` with the country name percent-encoded as one path segment
pub fn country_url(base_url: &str, country: &str) -> AppResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| service_error(ErrorCode::CountryService, "invalid restcountries url", e))?;

    url.path_segments_mut()
        .map_err(|_| AppError::from_code(ErrorCode::CountryService))?
        .pop_if_empty()
        .push("name")
        .push(country);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_url_plain() {
        let url = country_url("https://restcountries.com/v3.1", "Argentina").unwrap();
        assert_eq!(url.as_str(), "https://restcountries.com/v3.1/name/Argentina");

        let url = country_url("https://restcountries.com/v3.1/", "Argentina").unwrap();
        assert_eq!(url.path(), "/v3.1/name/Argentina");
    }

    #[test]
    fn test_country_url_escapes_reserved_chars() {
        let url = country_url("https://restcountries.com/v3.1", "Bosnia and Herzegovina").unwrap();
        assert_eq!(url.path(), "/v3.1/name/Bosnia%20and%20Herzegovina");

        let url = country_url("https://restcountries.com/v3.1", "a/b?c#d").unwrap();
        assert_eq!(url.path(), "/v3.1/name/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_country_url_rejects_bad_base() {
        let err = country_url("not a url", "Argentina").unwrap_err();
        assert_eq!(err.code, ErrorCode::CountryService);
    }
}

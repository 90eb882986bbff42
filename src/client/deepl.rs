//! DeepL REST API client.
//!
//! Blocking `reqwest` calls; run them on a worker thread, never on the UI thread.

use super::{
    GlossaryEntry, GlossaryInfo, Language, LanguagePair, LanguageRole, TranslateOptions,
    Translation, TranslationClient,
};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TSV_MIME: &str = "text/tab-separated-values";

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationBody>,
}

#[derive(Deserialize)]
struct TranslationBody {
    #[serde(default)]
    detected_source_language: Option<String>,
    text: String,
}

#[derive(Deserialize)]
struct GlossariesResponse {
    glossaries: Vec<GlossaryInfo>,
}

#[derive(Deserialize)]
struct LanguagePairsResponse {
    supported_languages: Vec<LanguagePair>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    detail: Option<String>,
}

/// Client for the DeepL API.
pub struct DeepLClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl DeepLClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("deepl-tui/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
            auth_header: format!("DeepL-Auth-Key {}", config.auth_key),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url, path)
    }

    /// Sends an authorized request and maps non-success statuses to errors.
    fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.header(AUTHORIZATION, &self.auth_header).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let err = error_for_status(status.as_u16(), &body);
        warn!("DeepL request failed: {}", err);
        Err(err)
    }
}

/// Maps a failed HTTP status and its body to a client error.
fn error_for_status(status: u16, body: &str) -> ClientError {
    match status {
        403 => ClientError::AuthorizationFailed,
        404 => ClientError::NotFound,
        429 => ClientError::TooManyRequests,
        456 => ClientError::QuotaExceeded,
        _ => {
            let message = match serde_json::from_str::<ErrorBody>(body) {
                Ok(ErrorBody {
                    message,
                    detail: Some(detail),
                }) => format!("{message} ({detail})"),
                Ok(ErrorBody { message, .. }) => message,
                Err(_) if body.trim().is_empty() => "no details".to_string(),
                Err(_) => body.trim().to_string(),
            };
            ClientError::Status { status, message }
        }
    }
}

fn into_translation(response: TranslateResponse) -> ClientResult<Translation> {
    if response.translations.is_empty() {
        return Err(ClientError::Malformed(
            "no translations in response".to_string(),
        ));
    }

    let detected_source_lang = response
        .translations
        .first()
        .and_then(|t| t.detected_source_language.clone());
    let text = response
        .translations
        .into_iter()
        .map(|t| t.text)
        .collect::<String>();

    Ok(Translation {
        text,
        detected_source_lang,
    })
}

/// Encodes entries as `source<TAB>target` lines.
pub fn encode_entries(entries: &[GlossaryEntry]) -> ClientResult<String> {
    let invalid = |term: &str| term.trim().is_empty() || term.contains(['\t', '\n', '\r']);

    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        if invalid(&entry.source) || invalid(&entry.target) {
            return Err(ClientError::Malformed(format!(
                "invalid glossary entry {:?} -> {:?}",
                entry.source, entry.target
            )));
        }
        lines.push(format!("{}\t{}", entry.source.trim(), entry.target.trim()));
    }
    Ok(lines.join("\n"))
}

/// Decodes a TSV entry list; blank lines are skipped.
pub fn decode_entries(body: &str) -> ClientResult<Vec<GlossaryEntry>> {
    body.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('\t')
                .map(|(source, target)| GlossaryEntry::new(source, target))
                .ok_or_else(|| ClientError::Malformed(format!("glossary line without tab: {line:?}")))
        })
        .collect()
}

impl TranslationClient for DeepLClient {
    fn list_languages(&self, role: LanguageRole) -> ClientResult<Vec<Language>> {
        let request = self
            .http
            .get(self.url("languages"))
            .query(&[("type", role.as_str())]);
        let languages: Vec<Language> = self.send(request)?.json()?;
        debug!("Fetched {} {} languages", languages.len(), role.as_str());
        Ok(languages)
    }

    fn translate(
        &self,
        text: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> ClientResult<Translation> {
        let mut form: Vec<(&str, &str)> = vec![("text", text), ("target_lang", target_lang)];
        if let Some(source_lang) = options.source_lang.as_deref() {
            form.push(("source_lang", source_lang));
        }
        if let Some(formality) = options.formality.and_then(|f| f.api_value()) {
            form.push(("formality", formality));
        }
        if let Some(glossary_id) = options.glossary_id.as_deref() {
            form.push(("glossary_id", glossary_id));
        }

        let request = self.http.post(self.url("translate")).form(&form);
        into_translation(self.send(request)?.json()?)
    }

    fn list_glossaries(&self) -> ClientResult<Vec<GlossaryInfo>> {
        let request = self.http.get(self.url("glossaries"));
        let response: GlossariesResponse = self.send(request)?.json()?;
        Ok(response.glossaries)
    }

    fn glossary_entries(&self, id: &str) -> ClientResult<Vec<GlossaryEntry>> {
        let request = self
            .http
            .get(self.url(&format!("glossaries/{id}/entries")))
            .header(ACCEPT, TSV_MIME);
        decode_entries(&self.send(request)?.text()?)
    }

    fn create_glossary(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        entries: &[GlossaryEntry],
    ) -> ClientResult<GlossaryInfo> {
        let entries = encode_entries(entries)?;
        let form = [
            ("name", name),
            ("source_lang", source_lang),
            ("target_lang", target_lang),
            ("entries", entries.as_str()),
            ("entries_format", "tsv"),
        ];
        let request = self.http.post(self.url("glossaries")).form(&form);
        Ok(self.send(request)?.json()?)
    }

    fn delete_glossary(&self, id: &str) -> ClientResult<()> {
        let request = self.http.delete(self.url(&format!("glossaries/{id}")));
        self.send(request)?;
        Ok(())
    }

    fn glossary_language_pairs(&self) -> ClientResult<Vec<LanguagePair>> {
        let request = self.http.get(self.url("glossary-language-pairs"));
        let response: LanguagePairsResponse = self.send(request)?.json()?;
        Ok(response.supported_languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_statuses() {
        assert!(matches!(
            error_for_status(403, ""),
            ClientError::AuthorizationFailed
        ));
        assert!(matches!(error_for_status(456, ""), ClientError::QuotaExceeded));
        assert!(matches!(
            error_for_status(429, ""),
            ClientError::TooManyRequests
        ));
    }

    #[test]
    fn carries_server_message() {
        let err = error_for_status(
            400,
            r#"{"message":"Bad request","detail":"Value for 'target_lang' not supported."}"#,
        );
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(
                    message,
                    "Bad request (Value for 'target_lang' not supported.)"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match error_for_status(500, "  ") {
            ClientError::Status { message, .. } => assert_eq!(message, "no details"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_translate_response() {
        let body = r#"{"translations":[{"detected_source_language":"EN","text":"Hallo Welt"}]}"#;
        let response: TranslateResponse = serde_json::from_str(body).unwrap();
        let translation = into_translation(response).unwrap();
        assert_eq!(translation.text, "Hallo Welt");
        assert_eq!(translation.detected_source_lang.as_deref(), Some("EN"));

        let empty: TranslateResponse = serde_json::from_str(r#"{"translations":[]}"#).unwrap();
        assert!(matches!(
            into_translation(empty),
            Err(ClientError::Malformed(_))
        ));
    }

    #[test]
    fn parses_glossary_listing() {
        let body = r#"{"glossaries":[{
            "glossary_id":"def3a26b-3e84-45b3-84ae-0c0aaf3525f7",
            "name":"My Glossary",
            "ready":true,
            "source_lang":"en",
            "target_lang":"de",
            "creation_time":"2021-08-03T14:16:18.329Z",
            "entry_count":1
        }]}"#;
        let response: GlossariesResponse = serde_json::from_str(body).unwrap();
        let info = &response.glossaries[0];
        assert_eq!(info.id, "def3a26b-3e84-45b3-84ae-0c0aaf3525f7");
        assert_eq!(info.name, "My Glossary");
        assert_eq!(info.entry_count, 1);
        assert_eq!(info.creation_time.format("%Y-%m-%d").to_string(), "2021-08-03");
    }

    #[test]
    fn decodes_tsv_entries() {
        let entries = decode_entries("artist\tMaler\r\n\nprize\tPreis\n").unwrap();
        assert_eq!(
            entries,
            vec![
                GlossaryEntry::new("artist", "Maler"),
                GlossaryEntry::new("prize", "Preis"),
            ]
        );
        assert!(decode_entries("no tab here").is_err());
    }

    #[test]
    fn rejects_terms_that_break_tsv() {
        let ok = encode_entries(&[
            GlossaryEntry::new("artist", "Maler"),
            GlossaryEntry::new(" prize ", "Preis"),
        ])
        .unwrap();
        assert_eq!(ok, "artist\tMaler\nprize\tPreis");

        assert!(encode_entries(&[GlossaryEntry::new("a\tb", "c")]).is_err());
        assert!(encode_entries(&[GlossaryEntry::new("a", "")]).is_err());
    }
}

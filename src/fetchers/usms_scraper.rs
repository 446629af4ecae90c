use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};

use crate::analysis::age_group;
use crate::analysis::timing::is_valid_swim_time;
use crate::cache::Cache;
use crate::config::ScraperSettings;
use crate::domain::{CourseType, RaceResult, ScrapedResults, SwimmerIdentity};
use crate::errors::SupplyError;
use crate::fetchers::ResultsSupplier;
use crate::http::RateLimitedClient;

const UNKNOWN_SWIMMER: &str = "Unknown Swimmer";
const MIN_RESULT_CELLS: usize = 8;

/// Scraper for the USMS individual meet results page
pub struct UsmsScraper {
    client: RateLimitedClient,
    parser: UsmsPageParser,
    cache: Option<Cache>,
    base_url: String,
}

impl UsmsScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = RateLimitedClient::new(
            &settings.user_agent,
            settings.timeout_secs,
            settings.rate_limit_ms,
        )?;
        let cache = if settings.use_cache {
            Some(Cache::new(&settings.cache_dir)?)
        } else {
            None
        };

        Ok(Self {
            client,
            parser: UsmsPageParser::new()?,
            cache,
            base_url: settings.base_url.clone(),
        })
    }

    // --- Cache ---

    fn cached_results(&self, key: &str) -> Option<ScrapedResults> {
        let cache = self.cache.as_ref()?;
        match cache.load_parsed::<ScrapedResults>(key) {
            Ok(Some(scraped)) if !scraped.results.is_empty() => {
                info!("Using cached results for {}", key);
                Some(scraped)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry for {}: {:#}", key, e);
                None
            }
        }
    }

    fn cached_page(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        cache.load_raw(key).unwrap_or_else(|e| {
            warn!("Ignoring unreadable cached page for {}: {:#}", key, e);
            None
        })
    }

    fn store<F>(&self, what: &str, save: F)
    where
        F: FnOnce(&Cache) -> Result<()>,
    {
        if let Some(cache) = &self.cache {
            if let Err(e) = save(cache) {
                warn!("Failed to cache {}: {:#}", what, e);
            }
        }
    }

    // --- HTTP Fetching ---

    /// Parse a page held in the raw tier; one without rows is treated as a miss
    fn parse_cached_page(&self, target: &UsmsTarget) -> Option<ScrapedResults> {
        let html = self.cached_page(&target.cache_key)?;
        let scraped = self.parser.parse_page(&html);
        if scraped.results.is_empty() {
            debug!("Cached page for {} has no results, fetching again", target.cache_key);
            return None;
        }
        debug!("Using cached page for {}", target.cache_key);
        Some(scraped)
    }

    /// Download and parse the results page; only pages with rows are cached
    async fn fetch_page(&self, target: &UsmsTarget, link: &str) -> Result<ScrapedResults, SupplyError> {
        info!("Fetching {}", target.url);
        let html = self
            .client
            .get_text(&target.url)
            .await
            .map_err(SupplyError::upstream)?;

        let scraped = self.parser.parse_page(&html);
        if scraped.results.is_empty() {
            return Err(SupplyError::NoResults(link.trim().to_string()));
        }

        self.store("page", |cache| cache.save_raw(&target.cache_key, &html));
        Ok(scraped)
    }
}

impl ResultsSupplier for UsmsScraper {
    fn name(&self) -> &str {
        "usms"
    }

    async fn fetch(&self, link: &str) -> Result<ScrapedResults, SupplyError> {
        let target = UsmsTarget::resolve(link, &self.base_url, &self.parser)?;

        if let Some(scraped) = self.cached_results(&target.cache_key) {
            return Ok(scraped);
        }

        let scraped = match self.parse_cached_page(&target) {
            Some(scraped) => scraped,
            None => self.fetch_page(&target, link).await?,
        };

        info!(
            "Scraped {} results for {}",
            scraped.results.len(),
            scraped.swimmer.name
        );
        self.store("results", |cache| cache.save_parsed(&target.cache_key, &scraped));
        Ok(scraped)
    }
}

/// Where to fetch a swimmer's results from, and what to cache them under
#[derive(Debug, Clone, PartialEq)]
pub struct UsmsTarget {
    pub url: String,
    pub cache_key: String,
}

impl UsmsTarget {
    /// Accepts a full URL, a bare `usms.org` link, or a SwimmerID
    pub fn resolve(link: &str, base_url: &str, parser: &UsmsPageParser) -> Result<Self, SupplyError> {
        let link = link.trim();
        if link.is_empty() {
            return Err(SupplyError::InvalidLink(link.to_string()));
        }

        if link.starts_with("http://") || link.starts_with("https://") {
            return Ok(Self::from_url(link.to_string()));
        }
        if link.contains("usms.org") {
            return Ok(Self::from_url(format!("https://{}", link)));
        }

        if !parser.is_swimmer_id(link) {
            return Err(SupplyError::InvalidLink(link.to_string()));
        }
        let id = link.to_uppercase();

        Ok(Self {
            url: Self::results_url(base_url, &id),
            cache_key: id,
        })
    }

    fn from_url(url: String) -> Self {
        let cache_key = Self::swimmer_id_param(&url)
            .map(str::to_uppercase)
            .unwrap_or_else(|| url.clone());
        Self { url, cache_key }
    }

    fn results_url(base_url: &str, id: &str) -> String {
        format!(
            "{}?SwimmerID={}&Sex=&StrokeID=0&Distance=&CourseID=0&lowage=&highage=",
            base_url,
            urlencoding::encode(id)
        )
    }

    fn swimmer_id_param(url: &str) -> Option<&str> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "SwimmerID")
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

/// Pulls swimmer identity and race rows out of a results page
pub struct UsmsPageParser {
    swimmer_id: Regex,
    heading_name: Regex,
    age_group_header: Regex,
    course_header: Regex,
    parenthesized: Regex,
    structure: Selector,
    rows: Selector,
    cells: Selector,
    links: Selector,
}

impl UsmsPageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            swimmer_id: compile(r"^[A-Z]{2}\d{2,3}[A-Z]$")?,
            heading_name: compile(r"for (.+?) \((\d+) swims?\)")?,
            age_group_header: compile(r"(\d+)-(\d+)\s*Age Group")?,
            course_header: compile(r"\b(SCY|SCM|LCM)\s+RESULTS")?,
            parenthesized: compile(r"\(([^)]+)\)")?,
            structure: select("h1, h2, h3, h4, table")?,
            rows: select("tr")?,
            cells: select("td, th")?,
            links: select("a[title]")?,
        })
    }

    pub fn is_swimmer_id(&self, candidate: &str) -> bool {
        self.swimmer_id.is_match(&candidate.trim().to_uppercase())
    }

    /// Walk headers and tables in document order, tagging each row with the
    /// course type and age group of the headers above it
    pub fn parse_page(&self, html: &str) -> ScrapedResults {
        let document = Html::parse_document(html);

        let mut swimmer_name: Option<String> = None;
        let mut course_type = CourseType::Scy;
        let mut header_age_group: Option<String> = None;
        let mut results = Vec::new();

        for element in document.select(&self.structure) {
            if element.value().name() == "table" {
                let before = results.len();
                for row in element.select(&self.rows) {
                    if let Some(result) = self.parse_row(row, course_type, header_age_group.as_deref()) {
                        results.push(result);
                    }
                }
                debug!("Table under {} yielded {} results", course_type.as_str(), results.len() - before);
                continue;
            }

            let text = element_text(element);
            if element.value().name() == "h3" && swimmer_name.is_none() {
                swimmer_name = self.swimmer_name(&text);
            }
            if let Some(detected) = self.detect_course_type(&text) {
                course_type = detected;
            }
            if let Some(caps) = self.age_group_header.captures(&text) {
                header_age_group = Some(format!("{}-{}", &caps[1], &caps[2]));
            }
        }

        let team = results.iter().find_map(|r: &RaceResult| r.club.clone());
        ScrapedResults {
            swimmer: SwimmerIdentity {
                name: swimmer_name.unwrap_or_else(|| UNKNOWN_SWIMMER.to_string()),
                age: None,
                team,
            },
            results,
        }
    }

    fn swimmer_name(&self, heading: &str) -> Option<String> {
        let caps = self.heading_name.captures(heading)?;
        Some(caps[1].trim().to_string())
    }

    /// Course type named by a section header; age-group headers never match
    pub fn detect_course_type(&self, header: &str) -> Option<CourseType> {
        let upper = header.to_uppercase();

        if upper.contains("SHORT COURSE YARDS") {
            return Some(CourseType::Scy);
        }
        if upper.contains("SHORT COURSE METERS") {
            return Some(CourseType::Scm);
        }
        if upper.contains("LONG COURSE METERS") {
            return Some(CourseType::Lcm);
        }

        let caps = self.course_header.captures(&upper)?;
        Some(CourseType::from(caps[1].to_string()))
    }

    // Name, Date (Meet), Age, Club, Event, Heat/Lane, Time, Place
    fn parse_row(
        &self,
        row: ElementRef,
        course_type: CourseType,
        header_age_group: Option<&str>,
    ) -> Option<RaceResult> {
        let cells: Vec<ElementRef> = row.select(&self.cells).collect();
        if cells.len() < MIN_RESULT_CELLS {
            return None;
        }

        let texts: Vec<String> = cells.iter().map(|c| element_text(*c)).collect();
        let time = texts[6].clone();
        if !is_valid_swim_time(&time) {
            return None;
        }

        let (date, meet) = self.split_date_cell(cells[1], &texts[1]);
        let age_text = texts[2].as_str();
        let age_group = match age_group::from_column(age_text) {
            group if group != age_group::UNKNOWN_GROUP => Some(group),
            _ => header_age_group.map(str::to_string),
        };

        Some(RaceResult {
            event: texts[4].clone(),
            time,
            date,
            meet,
            course_type,
            place: texts[7].parse().ok(),
            age: age_text.parse().ok(),
            age_group,
            club: Some(texts[3].clone()).filter(|club| !club.is_empty()),
            location: None,
        })
    }

    /// The date cell reads "2024-02-18 (Meet Name)" or links to the meet
    fn split_date_cell(&self, cell: ElementRef, text: &str) -> (String, String) {
        let date = text.split('(').next().unwrap_or_default().trim().to_string();

        let meet = cell
            .select(&self.links)
            .find_map(|link| link.value().attr("title"))
            .map(|title| title.trim().to_string())
            .or_else(|| {
                self.parenthesized
                    .captures(text)
                    .map(|caps| caps[1].trim().to_string())
            })
            .unwrap_or_default();

        (date, meet)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Failed to compile regex {}", pattern))
}

fn select(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to parse selector {}: {}", css, e))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE_URL: &str = "https://www.usms.org/comp/meets/indresults.php";

    const PAGE: &str = r#"
        <html><body>
        <h3>USMS Individual Meet Results for Jane Doe (3 swims)</h3>
        <h2>Short Course Yards Results [ SCM | LCM ]</h2>
        <h4>30-34 Age Group</h4>
        <table>
            <tr><th>Name</th><th>Date (Meet)</th><th>Age</th><th>Club</th><th>Event</th><th>Heat/Lane</th><th>Time</th><th>Place</th></tr>
            <tr><td>Jane Doe</td><td>2024-02-18 <a href="/meet/1" title="Viking Open">(M1)</a></td><td>31</td><td>PSM</td><td>50 Free</td><td>2/4</td><td>25.10</td><td>2</td></tr>
            <tr><td>Jane Doe</td><td>2024-02-18 (Viking Open)</td><td>31</td><td>PSM</td><td>100 Fly</td><td>1/3</td><td>DQ</td><td></td></tr>
        </table>
        <h2>Long Course Meters Results</h2>
        <h4>30-34 Age Group</h4>
        <table>
            <tr><td>Jane Doe</td><td>2024-07-20 (Summer Nationals)</td><td></td><td>PSM</td><td>100 Free</td><td>5/2</td><td>1:02.45</td><td>11</td></tr>
        </table>
        </body></html>
    "#;

    fn parser() -> UsmsPageParser {
        UsmsPageParser::new().unwrap()
    }

    #[test]
    fn test_parse_page_reads_identity_and_rows() {
        let scraped = parser().parse_page(PAGE);

        assert_eq!(scraped.swimmer.name, "Jane Doe");
        assert_eq!(scraped.swimmer.team.as_deref(), Some("PSM"));
        assert_eq!(scraped.results.len(), 2);

        let first = &scraped.results[0];
        assert_eq!(first.event, "50 Free");
        assert_eq!(first.date, "2024-02-18");
        assert_eq!(first.meet, "Viking Open");
        assert_eq!(first.course_type, CourseType::Scy);
        assert_eq!(first.place, Some(2));
        assert_eq!(first.age, Some(31));
        assert_eq!(first.age_group.as_deref(), Some("30-34"));
    }

    #[test]
    fn test_course_type_follows_section_headers() {
        let scraped = parser().parse_page(PAGE);

        let second = &scraped.results[1];
        assert_eq!(second.course_type, CourseType::Lcm);
        assert_eq!(second.meet, "Summer Nationals");
        assert_eq!(second.place, Some(11));
        assert_eq!(second.age, None);
        assert_eq!(second.age_group.as_deref(), Some("30-34"));
    }

    #[test]
    fn test_page_without_results() {
        let scraped = parser().parse_page("<html><body><p>No swims found</p></body></html>");

        assert!(scraped.results.is_empty());
        assert_eq!(scraped.swimmer.name, UNKNOWN_SWIMMER);
    }

    #[test]
    fn test_detect_course_type() {
        let parser = parser();

        assert_eq!(parser.detect_course_type("SCM Results for 25-29 Age Group"), Some(CourseType::Scm));
        assert_eq!(parser.detect_course_type("Short Course Meters"), Some(CourseType::Scm));
        assert_eq!(parser.detect_course_type("40-44 Age Group"), None);
        assert_eq!(parser.detect_course_type("Results"), None);
    }

    #[test]
    fn test_swimmer_id_format() {
        let parser = parser();

        assert!(parser.is_swimmer_id("MZ99C"));
        assert!(parser.is_swimmer_id("ab123c"));
        assert!(!parser.is_swimmer_id("MZ9C"));
        assert!(!parser.is_swimmer_id("MZ99CC"));
    }

    #[test]
    fn test_resolve_swimmer_id_builds_results_url() {
        let target = UsmsTarget::resolve(" mz99c ", BASE_URL, &parser()).unwrap();

        assert_eq!(target.cache_key, "MZ99C");
        assert_eq!(
            target.url,
            "https://www.usms.org/comp/meets/indresults.php?SwimmerID=MZ99C&Sex=&StrokeID=0&Distance=&CourseID=0&lowage=&highage="
        );
    }

    #[test]
    fn test_resolve_urls() {
        let parser = parser();

        let bare = UsmsTarget::resolve("www.usms.org/comp/meets/indresults.php?SwimmerID=ab12c", BASE_URL, &parser)
            .unwrap();
        assert!(bare.url.starts_with("https://www.usms.org/"));
        assert_eq!(bare.cache_key, "AB12C");

        let full = UsmsTarget::resolve("https://example.org/results", BASE_URL, &parser).unwrap();
        assert_eq!(full.cache_key, "https://example.org/results");
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        let parser = parser();

        assert!(matches!(
            UsmsTarget::resolve("not a swimmer", BASE_URL, &parser),
            Err(SupplyError::InvalidLink(_))
        ));
        assert!(matches!(
            UsmsTarget::resolve("", BASE_URL, &parser),
            Err(SupplyError::InvalidLink(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_serves_parsed_cache_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScraperSettings {
            cache_dir: dir.path().to_path_buf(),
            ..ScraperSettings::default()
        };
        Cache::new(dir.path()).unwrap().save_raw("MZ99C", PAGE).unwrap();
        let scraper = UsmsScraper::new(&settings).unwrap();

        let scraped = scraper.fetch("MZ99C").await.unwrap();

        assert_eq!(scraped.results.len(), 2);
        let cached: Option<ScrapedResults> = Cache::new(dir.path()).unwrap().load_parsed("MZ99C").unwrap();
        assert_eq!(cached, Some(scraped));
    }

    const EMPTY_PAGE: &str = "<html><body><p>Site maintenance</p></body></html>";

    /// Serve `first` on the initial request and `rest` afterwards
    async fn serve_pages(first: &'static str, rest: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = axum::Router::new().route(
            "/indresults.php",
            axum::routing::get(move || {
                let counter = counter.clone();
                async move {
                    let page = if counter.fetch_add(1, Ordering::SeqCst) == 0 { first } else { rest };
                    axum::response::Html(page)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{}/indresults.php", addr), hits)
    }

    fn local_settings(base_url: String, cache_dir: &std::path::Path) -> ScraperSettings {
        ScraperSettings {
            base_url,
            cache_dir: cache_dir.to_path_buf(),
            rate_limit_ms: 0,
            timeout_secs: 5,
            ..ScraperSettings::default()
        }
    }

    #[tokio::test]
    async fn test_empty_page_is_not_cached() {
        let (base_url, hits) = serve_pages(EMPTY_PAGE, PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        let scraper = UsmsScraper::new(&local_settings(base_url.clone(), dir.path())).unwrap();

        let first = scraper.fetch("MZ99C").await;
        assert!(matches!(first, Err(SupplyError::NoResults(_))));
        assert_eq!(Cache::new(dir.path()).unwrap().load_raw("MZ99C").unwrap(), None);

        let second = scraper.fetch("MZ99C").await.unwrap();
        assert_eq!(second.results.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let restarted = UsmsScraper::new(&local_settings(base_url, dir.path())).unwrap();
        assert_eq!(restarted.fetch("MZ99C").await.unwrap(), second);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_page_without_rows_is_refetched() {
        let (base_url, hits) = serve_pages(PAGE, PAGE).await;
        let dir = tempfile::tempdir().unwrap();
        Cache::new(dir.path()).unwrap().save_raw("MZ99C", EMPTY_PAGE).unwrap();
        let scraper = UsmsScraper::new(&local_settings(base_url, dir.path())).unwrap();

        let scraped = scraper.fetch("MZ99C").await.unwrap();

        assert_eq!(scraped.results.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let raw = Cache::new(dir.path()).unwrap().load_raw("MZ99C").unwrap();
        assert_eq!(raw.as_deref(), Some(PAGE));
    }
}

use super::{RepairContext, Scanner};
use crate::config::schema::LinkConfig;
use crate::error::DomError;
use crate::log::Category;
use url::Url;

pub const WARNING_CLASS: &str = "auto-repair-warning";

pub struct LinkScanner {
    config: LinkConfig,
}

impl LinkScanner {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// The HTTPS form of `href` when it points at a vendor host over plain HTTP.
    ///
    /// Only a literal `http://<host>` prefix is rewritten. Forms the URL parser
    /// would also accept (`http:host`, `http:/host`, userinfo before the host)
    /// are left alone rather than guessed at.
    fn upgraded(&self, href: &str) -> Option<String> {
        let href = href.trim();
        let prefix = href.get(..HTTP_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(HTTP_PREFIX) {
            return None;
        }
        let rest = &href[HTTP_PREFIX.len()..];

        let url = Url::parse(href).ok()?;
        let host = url.host_str()?;
        let is_vendor = self.config.vendor_domains.iter().any(|d| {
            host.eq_ignore_ascii_case(d)
                || host
                    .len()
                    .checked_sub(d.len() + 1)
                    .and_then(|at| host.get(at..))
                    .is_some_and(|tail| tail.eq_ignore_ascii_case(&format!(".{d}")))
        });
        if !is_vendor {
            return None;
        }
        let written = rest.get(..host.len())?;
        if !written.eq_ignore_ascii_case(host) {
            return None;
        }
        Some(format!("https://{rest}"))
    }
}

const HTTP_PREFIX: &str = "http://";

/// `setup.exe`, not `/setup.exe`, `docs/setup.exe`, `#top` or `mailto:a@b.c`.
pub fn is_bare_filename(href: &str) -> bool {
    !href.starts_with("http")
        && !href.starts_with('#')
        && !href.contains(':')
        && href.contains('.')
        && !href.contains('/')
}

fn is_empty_href(href: &str) -> bool {
    href.trim().is_empty() || href == "#"
}

impl Scanner for LinkScanner {
    fn name(&self) -> &'static str {
        "links"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        for link in cx.doc.query_selector_all("a[href]")? {
            let href = cx.doc.attribute(link, "href").unwrap_or_default();

            if is_empty_href(&href) {
                if cx.doc.has_class(link, WARNING_CLASS) {
                    continue;
                }
                cx.doc.add_class(link, WARNING_CLASS)?;
                cx.doc.set_attribute(link, "title", &self.config.warning_title)?;
                let text = cx.doc.text_content(link);
                let text = match text.trim() {
                    "" => "unknown link",
                    t => t,
                };
                cx.warn(Category::Link, format!("Empty link flagged: {text}"));
                continue;
            }

            if is_bare_filename(&href) {
                let fixed = format!("./{href}");
                cx.doc.set_attribute(link, "href", &fixed)?;
                cx.flash(link)?;
                cx.fixed(
                    Category::Link,
                    format!("Corrected relative path: {href} -> {fixed}"),
                );
                continue;
            }

            if let Some(secure) = self.upgraded(&href) {
                cx.warn(
                    Category::Link,
                    format!("Insecure vendor link found, upgrading to HTTPS: {href}"),
                );
                cx.doc.set_attribute(link, "href", &secure)?;
                cx.flash(link)?;
                cx.fixed(Category::Link, format!("Link repaired: {secure}"));
            }
        }
        Ok(())
    }
}

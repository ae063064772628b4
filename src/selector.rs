use crate::page::{ElementId, Page};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorStep {
    Id(String),
    Class(String),
    Tag(String),
}

pub(crate) fn parse_selector(selector: &str) -> Result<SelectorStep> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '>' | '+' | '~' | '[' | ':' | ','))
    {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }

    if let Some(id) = trimmed.strip_prefix('#') {
        if id.is_empty() || id.contains(['#', '.']) {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        return Ok(SelectorStep::Id(id.to_string()));
    }
    if let Some(class) = trimmed.strip_prefix('.') {
        if class.is_empty() || class.contains(['#', '.']) {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        return Ok(SelectorStep::Class(class.to_string()));
    }
    if trimmed.contains(['#', '.']) {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    Ok(SelectorStep::Tag(trimmed.to_ascii_lowercase()))
}

pub(crate) fn select_one(page: &Page, selector: &str) -> Result<ElementId> {
    let step = parse_selector(selector)?;
    match &step {
        SelectorStep::Id(id) => page
            .by_id(id)
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string())),
        _ => select_all_steps(page, &step)
            .into_iter()
            .next()
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string())),
    }
}

pub(crate) fn select_all(page: &Page, selector: &str) -> Result<Vec<ElementId>> {
    let step = parse_selector(selector)?;
    Ok(select_all_steps(page, &step))
}

fn select_all_steps(page: &Page, step: &SelectorStep) -> Vec<ElementId> {
    page.all_elements()
        .filter(|&element| match step {
            SelectorStep::Id(id) => page.node(element).id.as_deref() == Some(id.as_str()),
            SelectorStep::Class(class) => page.has_class(element, class),
            SelectorStep::Tag(tag) => page.tag_name(element).eq_ignore_ascii_case(tag),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Page {
        let mut page = Page::new();
        let section = page.create_element(page.root(), "section");
        page.add_class(section, "scroll-anim");
        let logo = page.create_element(section, "img");
        page.add_class(logo, "scroll-logo");
        let video = page.create_element(page.root(), "video");
        page.set_id(video, "intro-video");
        page.add_class(video, "product-video");
        page
    }

    #[test]
    fn id_selector_uses_index() {
        let page = sample_page();
        let found = select_one(&page, "#intro-video").unwrap();
        assert_eq!(page.node(found).id.as_deref(), Some("intro-video"));
        assert!(matches!(
            select_one(&page, "#missing"),
            Err(Error::SelectorNotFound(_))
        ));
    }

    #[test]
    fn class_selector_matches_in_document_order() {
        let page = sample_page();
        let matches = select_all(&page, ".product-video").unwrap();
        assert_eq!(matches.len(), 1);
        let logo = select_one(&page, ".scroll-logo").unwrap();
        assert!(page.has_class(logo, "scroll-logo"));
    }

    #[test]
    fn tag_selector_is_case_insensitive() {
        let page = sample_page();
        assert_eq!(select_all(&page, "VIDEO").unwrap().len(), 1);
        assert_eq!(select_all(&page, "body").unwrap().len(), 1);
    }

    #[test]
    fn combinators_and_compounds_are_unsupported() {
        let page = sample_page();
        for selector in [
            "",
            "  ",
            "section .scroll-logo",
            "video.product-video",
            "#a#b",
            ".a.b",
            "video:first-child",
            "section > img",
        ] {
            assert!(
                matches!(
                    select_one(&page, selector),
                    Err(Error::UnsupportedSelector(_))
                ),
                "expected unsupported selector: {selector:?}"
            );
        }
    }
}

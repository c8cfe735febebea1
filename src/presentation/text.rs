//! Plain-text rendering of page views for the terminal.

use std::fmt::Write;

use super::views::{
    CategoryNav, LinkView, ListingBody, ListingPage, PageHeader, PostCard, PostPage, SearchBody,
    SearchPage,
};

const LOADING: &str = "Loading...";

pub fn listing(page: &ListingPage) -> String {
    let mut out = header(&page.header);
    match &page.body {
        ListingBody::Loading => line(&mut out, LOADING),
        ListingBody::Failed { message } | ListingBody::Empty { message } => line(&mut out, message),
        ListingBody::Cards(cards) => write_cards(&mut out, cards),
    }
    out
}

pub fn post(page: &PostPage) -> String {
    let mut out = String::new();
    match page {
        PostPage::Loading => line(&mut out, LOADING),
        PostPage::Failed { message } => line(&mut out, message),
        PostPage::Ready(detail) => {
            line(&mut out, &detail.title);
            line(&mut out, &"=".repeat(detail.title.chars().count()));
            if !detail.categories.is_empty() {
                line(&mut out, &links(&detail.categories));
            }
            let author = byline(&detail.author.name, detail.author.href.as_deref());
            line(&mut out, &format!("{author} · {}", detail.published));
            line(&mut out, &format!("Cover: {}", detail.cover_url));
            out.push('\n');
            line(&mut out, &detail.content_html);
            if !detail.tags.is_empty() {
                out.push('\n');
                line(&mut out, &format!("Tags: {}", links(&detail.tags)));
            }
        }
    }
    out
}

pub fn search(page: &SearchPage) -> String {
    let mut out = header(&page.header);
    match &page.body {
        SearchBody::Loading => line(&mut out, LOADING),
        SearchBody::Failed { message } | SearchBody::Prompt { message } => line(&mut out, message),
        SearchBody::Searching { query } => line(&mut out, &format!("Searching for \"{query}\"...")),
        SearchBody::NoResults { message } => line(&mut out, message),
        SearchBody::Results { summary, cards } => {
            line(&mut out, summary);
            out.push('\n');
            write_cards(&mut out, cards);
        }
    }
    out
}

pub fn categories(nav: &CategoryNav) -> String {
    let mut out = header(&PageHeader {
        title: "Categories".to_string(),
        description: None,
    });
    if nav.links.is_empty() {
        line(&mut out, "No categories.");
    }
    for link in &nav.links {
        line(&mut out, &format!("- {} ({})", link.label, link.href));
    }
    out
}

fn header(header: &PageHeader) -> String {
    let mut out = String::new();
    line(&mut out, &header.title);
    if let Some(description) = header.description.as_deref() {
        line(&mut out, description);
    }
    out.push('\n');
    out
}

fn write_cards(out: &mut String, cards: &[PostCard]) {
    for (index, card) in cards.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        line(out, &format!("{} ({})", card.title, card.href));
        if !card.categories.is_empty() {
            line(out, &format!("  {}", links(&card.categories)));
        }
        line(out, &format!("  {}", card.excerpt));
        line(
            out,
            &format!(
                "  {} · {}",
                byline(&card.author.name, card.author.href.as_deref()),
                card.published
            ),
        );
    }
}

fn links(links: &[LinkView]) -> String {
    links
        .iter()
        .map(|link| format!("[{}]", link.label))
        .collect::<Vec<_>>()
        .join(" ")
}

fn byline(name: &str, href: Option<&str>) -> String {
    match href {
        Some(href) => format!("{name} ({href})"),
        None => name.to_string(),
    }
}

fn line(out: &mut String, text: &str) {
    let _ = writeln!(out, "{text}");
}

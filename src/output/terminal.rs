// Colored terminal output for hashtag lists, recommendations, and places.
//
// The main.rs subcommands delegate all formatting here.

use colored::Colorize;

use crate::db::models::{Category, PlaceSummary};
use crate::hashtags::frequency::HashtagSummary;
use crate::service::{PlaceDetail, PlaceRecommendation};

/// Display an aggregated hashtag list for a viewport.
pub fn display_hashtags(category: &str, summary: &HashtagSummary) {
    if summary.is_empty() {
        println!("No hashtags for {category} in this viewport.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Hashtags: {} ({}) ===", category, summary.len()).bold()
    );
    println!();

    match summary {
        HashtagSummary::Ranked(counts) => {
            println!("  {:>4}  {:<32} {:>6}", "Rank".dimmed(), "Hashtag".dimmed(), "Places".dimmed());
            println!("  {}", "-".repeat(46).dimmed());
            for (i, tc) in counts.iter().enumerate() {
                println!(
                    "  {:>4}. {:<32} {:>6}",
                    i + 1,
                    super::truncate_chars(&tc.tag, 30).cyan(),
                    tc.count
                );
            }
        }
        HashtagSummary::Unique(_) => {
            let mut tags = summary.tags();
            // Unordered set; sort for a stable display only.
            tags.sort();
            println!("  {}", tags.join("  ").cyan());
        }
    }
    println!();
}

/// Display ranked recommendations.
pub fn display_recommendations(category: &str, results: &[PlaceRecommendation]) {
    if results.is_empty() {
        println!("No matching {category} places in this viewport.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Recommendations: {} ({}) ===", category, results.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<32} {:>10} {:>10}  {:>6}",
        "Rank".dimmed(),
        "Place".dimmed(),
        "X".dimmed(),
        "Y".dimmed(),
        "Sim".dimmed(),
    );
    println!("  {}", "-".repeat(68).dimmed());

    for (i, r) in results.iter().enumerate() {
        println!(
            "  {:>4}. {:<32} {:>10.5} {:>10.5}  {}",
            i + 1,
            super::truncate_chars(&r.name, 30),
            r.x,
            r.y,
            colorize_similarity(r.similarity),
        );
    }
    println!();
}

/// Display a plain viewport listing.
pub fn display_places(category: &str, places: &[PlaceSummary]) {
    if places.is_empty() {
        println!("No {category} places in this viewport.");
        return;
    }
    println!(
        "\n{}",
        format!("=== Places: {} ({}) ===", category, places.len()).bold()
    );
    for place in places {
        println!(
            "  {:>6}  {:<32} ({:.5}, {:.5})",
            place.id.to_string().dimmed(),
            super::truncate_chars(&place.name, 30),
            place.x,
            place.y
        );
    }
    println!();
}

/// Display the union of hashtags for a region.
pub fn display_region_hashtags(region: &str, hashtags: &[String]) {
    println!(
        "\n{}",
        format!("=== Region: {} ({} hashtags) ===", region, hashtags.len()).bold()
    );
    for tag in hashtags {
        println!("  {}", tag.cyan());
    }
    println!();
}

/// Display a single place's details.
pub fn display_place_detail(detail: &PlaceDetail) {
    println!("\n{}", format!("=== {} ===", detail.name).bold());
    println!("  Category: {}", colorize_category(detail.category));
    println!("  Location: ({:.5}, {:.5})", detail.x, detail.y);
    if let Some(address) = &detail.address {
        println!("  Address: {address}");
    }
    match (&detail.open_time, &detail.close_time) {
        (Some(open), Some(close)) => println!("  Hours: {open} - {close}"),
        (Some(open), None) => println!("  Opens: {open}"),
        (None, Some(close)) => println!("  Closes: {close}"),
        (None, None) => {}
    }
    if let Some(code) = detail.region_code {
        println!("  Region code: {code}");
    }
    if !detail.image_urls.is_empty() {
        println!("  Images:");
        for url in &detail.image_urls {
            println!("    {}", url.dimmed());
        }
    }
    println!();
}

fn colorize_similarity(similarity: f64) -> colored::ColoredString {
    let text = format!("{similarity:>6.3}");
    if similarity >= 0.8 {
        text.green().bold()
    } else if similarity >= 0.5 {
        text.green()
    } else if similarity > 0.0 {
        text.yellow()
    } else {
        text.dimmed()
    }
}

fn colorize_category(category: Category) -> colored::ColoredString {
    let name = category.as_str();
    match category {
        Category::Cafe => name.yellow(),
        Category::Hotel => name.blue(),
        Category::Restaurant => name.red(),
        Category::TourSite => name.green(),
        Category::TransportNode => name.magenta(),
    }
}

//! Plain-text rendering of read snapshots for the terminal.

use crate::league::{LeagueAverages, TeamReport};
use crate::stats::query::Page;
use crate::stats::TeamRecord;

pub fn team_report(report: &TeamReport) -> String {
    let t = &report.team;
    let rows: [(&str, String); 14] = [
        ("Played", t.played().to_string()),
        ("Won", t.won().to_string()),
        ("Drawn", t.drawn().to_string()),
        ("Lost", t.lost().to_string()),
        ("Goals for", t.goals_for().to_string()),
        ("Goals against", t.goals_against().to_string()),
        ("Total points", t.total_points().to_string()),
        ("Home points", t.home_points().to_string()),
        ("Away points", t.away_points().to_string()),
        ("Goal difference", t.goal_difference().to_string()),
        ("Win percentage (%)", format!("{:.2}", t.win_percentage())),
        ("Goals per match", format!("{:.2}", t.goals_per_match())),
        (
            "League goals per match",
            format!("{:.2}", report.league.goals_per_match),
        ),
        (
            "League points per match",
            format!("{:.2}", report.league.points_per_match),
        ),
    ];

    let mut out = format!("Statistics for {} ({}):\n", t.name(), t.id());
    out.push_str(&format!("{:<26} {:>10}\n", "Metric", "Value"));
    for (metric, value) in rows {
        out.push_str(&format!("{:<26} {:>10}\n", metric, value));
    }
    out
}

pub fn ranking(teams: &[TeamRecord]) -> String {
    let mut out = format!("Top {} teams by points:\n", teams.len());
    out.push_str(&format!("{:>3} | {:<24} | {:>6}\n", "Pos", "Name", "Points"));
    out.push_str(&"-".repeat(39));
    out.push('\n');
    for (pos, team) in teams.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} | {:<24} | {:>6}\n",
            pos + 1,
            team.name(),
            team.total_points()
        ));
    }
    out
}

pub fn averages(avg: &LeagueAverages) -> String {
    format!(
        "League goals per match:  {:.2}\nLeague points per match: {:.2}\n",
        avg.goals_per_match, avg.points_per_match
    )
}

pub fn listing(page: &Page) -> String {
    let mut out = format!(
        "{:<8} {:<24} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>7} {:>6}\n",
        "ID", "Name", "Played", "Points", "GF", "GA", "Home", "Away", "GD", "Win%", "G/M"
    );
    for t in &page.items {
        out.push_str(&format!(
            "{:<8} {:<24} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>7.2} {:>6.2}\n",
            t.id(),
            t.name(),
            t.played(),
            t.total_points(),
            t.goals_for(),
            t.goals_against(),
            t.home_points(),
            t.away_points(),
            t.goal_difference(),
            t.win_percentage(),
            t.goals_per_match()
        ));
    }
    out.push_str(&format!(
        "Page {} of {} ({} team(s))\n",
        page.page, page.total_pages, page.total_items
    ));
    out
}

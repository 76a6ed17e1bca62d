//! Extraction of team links and roster rows from the source's HTML pages.

use std::sync::OnceLock;

use regex::Regex;

use super::{RosterEntry, TeamLink};
use crate::error::{Result, SquadError};

/// Row that separates the current squad from departed players.
const DEPARTED_MARKER: &str = "players no longer at this club";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern"))
}

fn main_section(html: &str) -> &str {
    static MAIN: OnceLock<Regex> = OnceLock::new();
    let re = regex(&MAIN, r#"(?i)<div[^>]*\bid\s*=\s*["']?main\b"#);
    match re.find(html) {
        Some(m) => &html[m.start()..],
        None => html,
    }
}

/// Strip tags, decode character references and collapse whitespace.
pub fn cell_text(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let stripped = regex(&TAG, r"(?s)<[^>]*>").replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Team links listed on a league page (`div#main h5 a`).
pub fn parse_league_teams(html: &str) -> Vec<TeamLink> {
    static LINK: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &LINK,
        r#"(?is)<h5[^>]*>\s*<a[^>]*\bhref\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#,
    );

    re.captures_iter(main_section(html))
        .filter_map(|cap| {
            let token = cap.get(1)?.as_str().trim().to_string();
            let name = cell_text(cap.get(2)?.as_str());
            if token.is_empty() || name.is_empty() {
                return None;
            }
            Some(TeamLink { token, name })
        })
        .collect()
}

fn rows(table: &str) -> Vec<Vec<String>> {
    static ROW: OnceLock<Regex> = OnceLock::new();
    static CELL: OnceLock<Regex> = OnceLock::new();
    let row_re = regex(&ROW, r"(?is)<tr[^>]*>(.*?)</tr>");
    let cell_re = regex(&CELL, r"(?is)<t[dh][^>]*>(.*?)</t[dh]>");

    row_re
        .captures_iter(table)
        .map(|row| {
            cell_re
                .captures_iter(&row[1])
                .map(|cell| cell_text(&cell[1]))
                .collect()
        })
        .collect()
}

fn find_column(header: &[String], labels: &[&str]) -> Option<usize> {
    header.iter().position(|h| {
        let h = h.to_lowercase();
        labels.iter().any(|label| h == *label)
    })
}

/// Roster rows of a team page.
///
/// The name and date-of-birth columns are located by header label because
/// table shape varies between seasons. Rows after the departed-players
/// separator are excluded and rows with a blank name are dropped.
pub fn parse_team_roster(html: &str) -> Result<Vec<RosterEntry>> {
    static TABLE: OnceLock<Regex> = OnceLock::new();
    let table_re = regex(&TABLE, r"(?is)<table[^>]*>(.*?)</table>");
    let table = table_re
        .captures(main_section(html))
        .and_then(|cap| cap.get(1))
        .ok_or_else(|| SquadError::Parse("Roster table not found".to_string()))?
        .as_str();

    let rows = rows(table);
    let header_idx = rows
        .iter()
        .position(|r| find_column(r, &["name"]).is_some())
        .ok_or_else(|| SquadError::Parse("Roster header row not found".to_string()))?;
    let header = &rows[header_idx];
    let name_col = find_column(header, &["name"])
        .ok_or_else(|| SquadError::Parse("Name column not found".to_string()))?;
    let dob_col = find_column(header, &["date of birth", "dob", "born", "birth date"]);

    let mut entries = Vec::new();
    for row in &rows[header_idx + 1..] {
        if row
            .iter()
            .any(|cell| cell.to_lowercase() == DEPARTED_MARKER)
        {
            break;
        }
        let name = match row.get(name_col) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => continue,
        };
        // A repeated header row is not a player.
        if name.eq_ignore_ascii_case("name") {
            continue;
        }
        let dob = dob_col
            .and_then(|col| row.get(col))
            .cloned()
            .unwrap_or_default();
        entries.push(RosterEntry { name, dob });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GameGraph;
    use crate::model::{Country, League, Player, PlayerSet, Season, Team};

    const LEAGUE_PAGE: &str = r#"
        <html><body>
        <div id="menu"><h5><a href="../index.htm">Home</a></h5></div>
        <div id="main">
          <h2>FA Premier League 2003-2004</h2>
          <h5><a href="faprem/arsenal.htm">Arsenal</a></h5>
          <h5><a href="faprem/brighton.htm">Brighton &amp; Hove Albion</a></h5>
          <h5>No link here</h5>
        </div>
        </body></html>
    "#;

    const TEAM_PAGE: &str = r#"
        <div id="main">
        <table>
          <tr><td colspan="3">Arsenal 2003-2004</td></tr>
          <tr><th>Number</th><th>Name</th><th>Nat</th><th>Date of Birth</th></tr>
          <tr><td>1</td><td>Jens <b>Lehmann</b></td><td>GER</td><td>10-11-69</td></tr>
          <tr><td>14</td><td>Thierry Henry</td><td>FRA</td><td>17-08-77</td></tr>
          <tr><td>&nbsp;</td><td>&nbsp;</td><td></td><td></td></tr>
          <tr><td colspan="4">Players no longer at this club</td></tr>
          <tr><td>9</td><td>Francis Jeffers</td><td>ENG</td><td>25-01-81</td></tr>
        </table>
        </div>
    "#;

    #[test]
    fn test_parse_league_teams() {
        let teams = parse_league_teams(LEAGUE_PAGE);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].token, "faprem/arsenal.htm");
        assert_eq!(teams[0].name, "Arsenal");
        assert_eq!(teams[1].name, "Brighton & Hove Albion");
    }

    #[test]
    fn test_parse_team_roster_excludes_departed() {
        let roster = parse_team_roster(TEAM_PAGE).unwrap();
        assert_eq!(
            roster,
            vec![
                RosterEntry {
                    name: "Jens Lehmann".into(),
                    dob: "10-11-69".into()
                },
                RosterEntry {
                    name: "Thierry Henry".into(),
                    dob: "17-08-77".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_team_roster_resolves_columns_by_label() {
        let html = r#"<div id="main"><table>
            <tr><td>Name</td><td>Pos</td><td>DOB</td><td>Club</td><td>Number</td></tr>
            <tr><td>Kaká</td><td>M</td><td>22-04-82</td><td>São Paulo</td><td>22</td></tr>
        </table></div>"#;
        let roster = parse_team_roster(html).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "Kaká");
        assert_eq!(roster[0].dob, "22-04-82");
    }

    #[test]
    fn test_cell_text_decodes_character_references() {
        assert_eq!(cell_text("Kak&aacute;"), "Kaká");
        assert_eq!(cell_text("Zlatan Ibrahimovi&#263;"), "Zlatan Ibrahimović");
        assert_eq!(cell_text("Ibrahimovi&#x107;"), "Ibrahimović");
        assert_eq!(cell_text("&nbsp;Ole&nbsp;Gunnar <i>Solskj&aelig;r</i> "), "Ole Gunnar Solskjær");
        assert_eq!(cell_text("1 &lt; 2 &amp;&amp; 3"), "1 < 2 && 3");
    }

    #[test]
    fn test_parse_team_roster_decodes_accented_names() {
        let html = r#"<div id="main"><table>
            <tr><th>Name</th><th>Date of Birth</th></tr>
            <tr><td>Kak&aacute;</td><td>22-04-82</td></tr>
            <tr><td>Zlatan Ibrahimovi&#263;</td><td>03-10-81</td></tr>
        </table></div>"#;
        let roster = parse_team_roster(html).unwrap();
        let names: Vec<_> = roster.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Kaká", "Zlatan Ibrahimović"]);

        let team = Team::new(
            League::new(Country::Brazil, "bracamp", Season::single(2008)),
            "Sao Paulo",
            None,
        );
        let mut set = PlayerSet::new("roster");
        for entry in &roster {
            set.join(Player::new(&entry.name, &entry.dob), &team);
        }
        let mut graph = GameGraph::new();
        graph.add(set);
        assert_eq!(graph.find_player_by_name("kaka").unwrap().dob(), "22-04-82");
        assert_eq!(
            graph.find_player_by_name("zlatan ibrahimovic").unwrap().name(),
            "Zlatan Ibrahimović"
        );
    }

    #[test]
    fn test_parse_team_roster_without_table_fails() {
        assert!(parse_team_roster("<div id=\"main\"><p>Not found</p></div>").is_err());
    }
}

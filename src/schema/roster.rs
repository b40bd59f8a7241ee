//! Championship roster rows
//!
//! The roster is a plain comma-separated export with a header row and at least
//! seven columns:
//!
//! ```text
//! 0: Position  1: Driver  2: Country  3: City  4: Team  5: Class  6: Car
//! ```
//!
//! Fields are not quoted, so a comma inside a value shifts the columns. Rows
//! with fewer than seven fields are skipped; that is a filtering policy, not an
//! error.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Minimum number of comma-separated fields a roster row must carry.
pub const ROSTER_MIN_COLUMNS: usize = 7;

const DRIVER_COLUMN: usize = 1;
const TEAM_COLUMN: usize = 4;
const CLASS_COLUMN: usize = 5;
const CAR_COLUMN: usize = 6;

/// One registered participant as written in the roster.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    /// Driver full name
    pub driver: String,
    /// Championship class
    pub car_class: String,
    /// Team; `None` when the column is empty or `-`
    pub team: Option<String>,
    /// Declared car; may be empty or `-`
    pub car: String,
}

/// Parse roster text into participants.
///
/// The first line is always treated as a header. Rows with too few columns or
/// an empty driver name are dropped.
pub fn parse_roster(text: &str) -> Vec<RawParticipant> {
    text.split('\n').skip(1).filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<RawParticipant> {
    let cols: Vec<&str> = line.split(',').map(str::trim).collect();
    if cols.len() < ROSTER_MIN_COLUMNS {
        if !line.trim().is_empty() {
            trace!(columns = cols.len(), "Skipping short roster row");
        }
        return None;
    }

    let driver = cols[DRIVER_COLUMN];
    if driver.is_empty() {
        return None;
    }

    let team = match cols[TEAM_COLUMN] {
        "" | "-" => None,
        team => Some(team.to_string()),
    };

    Some(RawParticipant {
        driver: driver.to_string(),
        car_class: cols[CLASS_COLUMN].to_string(),
        team,
        car: cols[CAR_COLUMN].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
Pos,Driver,Country,City,Team,Class,Car
1,Abubekirov Asker,Russia,Nalchik,Elbrus Motorsport,Silver,LADA Vesta NG Super-production
2, Ivanov  Ivan ,Russia,Moscow,-,GT3,
3,Petrov Petr,Russia,Kazan,,Bronze,-
4,Too,Short,Row
";

    #[test]
    fn parses_rows_after_header() {
        let participants = parse_roster(ROSTER);
        assert_eq!(participants.len(), 3);

        assert_eq!(
            participants[0],
            RawParticipant {
                driver: "Abubekirov Asker".to_string(),
                car_class: "Silver".to_string(),
                team: Some("Elbrus Motorsport".to_string()),
                car: "LADA Vesta NG Super-production".to_string(),
            }
        );
    }

    #[test]
    fn dash_and_empty_team_become_absent() {
        let participants = parse_roster(ROSTER);
        assert_eq!(participants[1].team, None);
        assert_eq!(participants[2].team, None);
        assert_eq!(participants[1].driver, "Ivanov  Ivan");
        assert_eq!(participants[1].car, "");
        assert_eq!(participants[2].car, "-");
    }

    #[test]
    fn header_only_or_empty_text_yields_nothing() {
        assert!(parse_roster("").is_empty());
        assert!(parse_roster("Pos,Driver,Country,City,Team,Class,Car").is_empty());
    }

    #[test]
    fn header_is_skipped_even_when_it_looks_like_data() {
        let text = "1,Header Driver,RU,Moscow,-,GT3,Car\n2,Real Driver,RU,Moscow,-,GT3,Car";
        let participants = parse_roster(text);
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].driver, "Real Driver");
    }

    #[test]
    fn rows_without_driver_name_are_dropped() {
        let text = "header\n1,,RU,Moscow,-,GT3,Car";
        assert!(parse_roster(text).is_empty());
    }

    #[test]
    fn windows_line_endings_are_trimmed() {
        let text = "header\r\n1,Ivan Ivanov,RU,Moscow,-,GT3,BMW M4 GT3\r\n";
        let participants = parse_roster(text);
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].car, "BMW M4 GT3");
    }
}

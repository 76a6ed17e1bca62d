//! Flat-file encoding of a team roster: CSV with an `id,name,dob` header.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SquadError};
use crate::model::{Player, PlayerId};

const HEADER: [&str; 3] = ["id", "name", "dob"];

#[derive(Debug, Serialize, Deserialize)]
struct RosterRecord {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    dob: String,
}

/// Encode players as roster CSV. The header row is written even for an empty roster.
pub fn encode(players: &[Player]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for player in players {
        writer.serialize(RosterRecord {
            id: player.id().to_string(),
            name: player.name().to_string(),
            dob: player.dob().to_string(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| SquadError::Io(e.into_error()))
}

/// Decode roster CSV. A stored `id` is trusted; rows without one get a derived id.
pub fn decode<R: Read>(input: R) -> Result<Vec<Player>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut players = Vec::new();
    for record in reader.deserialize::<RosterRecord>() {
        let record = record?;
        if record.name.is_empty() {
            continue;
        }
        let player = if record.id.is_empty() {
            Player::new(record.name, record.dob)
        } else {
            Player::with_id(PlayerId::from_stored(record.id), record.name, record.dob)
        };
        players.push(player);
    }
    Ok(players)
}

pub fn read(path: &Path) -> Result<Vec<Player>> {
    let file = std::fs::File::open(path)?;
    decode(std::io::BufReader::new(file))
}

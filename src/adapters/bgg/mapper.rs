//! Maps BGG XML API v2 documents into domain entities.

use crate::domain::{DateRange, DomainError, GameData, GameId, PlaySession};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

/// BGG returns at most this many plays per page.
pub const PLAYS_PAGE_SIZE: usize = 100;

const EXPANSION_TYPE: &str = "boardgameexpansion";

/// `<plays total=".." page="..">` root. Error documents (e.g. `<div class="messagebox error">`)
/// also deserialize into this, with no plays.
#[derive(Debug, Deserialize)]
struct XmlPlays {
    #[serde(rename = "@total", default)]
    total: usize,
    #[serde(rename = "play", default)]
    plays: Vec<XmlPlay>,
}

#[derive(Debug, Deserialize)]
struct XmlPlay {
    #[serde(rename = "@id")]
    id: u64,
    #[serde(rename = "@date", default)]
    date: String,
    #[serde(rename = "@quantity", default)]
    quantity: u32,
    #[serde(rename = "@length", default)]
    length: u32,
    #[serde(rename = "@incomplete", default)]
    incomplete: u8,
    #[serde(rename = "@location", default)]
    location: String,
    item: XmlPlayItem,
}

#[derive(Debug, Deserialize)]
struct XmlPlayItem {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@objectid")]
    object_id: GameId,
}

/// `<items>` root of a `/thing` response.
#[derive(Debug, Deserialize)]
struct XmlItems {
    #[serde(rename = "item", default)]
    items: Vec<XmlThing>,
}

#[derive(Debug, Deserialize)]
struct XmlThing {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@id")]
    id: GameId,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(rename = "name", default)]
    names: Vec<XmlName>,
    #[serde(rename = "yearpublished", default)]
    year_published: Option<XmlValue>,
}

#[derive(Debug, Deserialize)]
struct XmlName {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct XmlValue {
    #[serde(rename = "@value")]
    value: String,
}

/// One page of plays plus the total BGG reports for the query.
#[derive(Debug)]
pub struct PlaysPage {
    pub total: usize,
    /// Number of `<play>` elements on the page, including dropped ones.
    pub raw_len: usize,
    pub plays: Vec<PlaySession>,
}

/// Parse a `/plays` page. Undated plays and plays outside `range` are dropped.
pub fn plays_page(user: &str, xml: &str, range: DateRange) -> Result<PlaysPage, DomainError> {
    if xml.trim().is_empty() {
        return Ok(PlaysPage {
            total: 0,
            raw_len: 0,
            plays: Vec::new(),
        });
    }
    let doc: XmlPlays = quick_xml::de::from_str(xml)
        .map_err(|e| DomainError::Remote(format!("decode plays for {}: {}", user, e)))?;
    let raw_len = doc.plays.len();
    let plays = doc
        .plays
        .into_iter()
        .filter_map(|p| {
            let date = match NaiveDate::parse_from_str(&p.date, "%Y-%m-%d") {
                Ok(d) => d,
                Err(_) => {
                    debug!(user, play_id = p.id, date = %p.date, "dropping undated play");
                    return None;
                }
            };
            if !range.contains(date) {
                debug!(user, play_id = p.id, %date, "dropping play outside range");
                return None;
            }
            Some(PlaySession {
                id: p.id,
                user: user.to_string(),
                date,
                game_id: p.item.object_id,
                game_name: p.item.name,
                quantity: p.quantity,
                length_minutes: p.length,
                location: Some(p.location).filter(|l| !l.trim().is_empty()),
                incomplete: p.incomplete != 0,
            })
        })
        .collect();
    Ok(PlaysPage {
        total: doc.total,
        raw_len,
        plays,
    })
}

/// Parse a `/thing` response for `game_id`.
pub fn game(game_id: GameId, xml: &str) -> Result<GameData, DomainError> {
    let doc: XmlItems = quick_xml::de::from_str(xml)
        .map_err(|e| DomainError::Remote(format!("decode game {}: {}", game_id, e)))?;
    let thing = doc
        .items
        .into_iter()
        .find(|t| t.id == game_id)
        .ok_or_else(|| DomainError::NotFound(format!("game {}", game_id)))?;

    let name = thing
        .names
        .iter()
        .find(|n| n.kind == "primary")
        .or_else(|| thing.names.first())
        .map(|n| n.value.clone())
        .unwrap_or_else(|| format!("#{}", game_id));

    Ok(GameData {
        id: thing.id,
        name,
        expansion: thing.kind == EXPANSION_TYPE,
        image_url: non_empty(thing.image),
        thumbnail_url: non_empty(thing.thumbnail),
        year_published: thing
            .year_published
            .and_then(|y| y.value.trim().parse().ok())
            .filter(|y: &i32| *y != 0),
    })
}

/// BGG used to hand out protocol-relative image URLs (`//cf.geekdo-images.com/..`).
pub fn absolute_image_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year_2014() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(),
        )
    }

    const PLAYS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<plays username="tomusher" userid="1" total="3" page="1" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <play id="101" date="2014-03-03" quantity="1" length="90" incomplete="0" nowinstats="0" location="Aberystwyth">
    <item name="Catan" objecttype="thing" objectid="13">
      <subtypes><subtype value="boardgame"/></subtypes>
    </item>
    <players><player username="tomusher" userid="1" name="Tom" startposition="" color="" score="" new="0" rating="0" win="1"/></players>
  </play>
  <play id="102" date="0000-00-00" quantity="1" length="0" incomplete="1" nowinstats="0" location="">
    <item name="Carcassonne" objecttype="thing" objectid="822"><subtypes><subtype value="boardgame"/></subtypes></item>
  </play>
  <play id="103" date="2014-03-10" quantity="2" length="0" incomplete="1" nowinstats="0" location="">
    <item name="Catan: Seafarers" objecttype="thing" objectid="325"><subtypes><subtype value="boardgameexpansion"/></subtypes></item>
  </play>
</plays>"#;

    #[test]
    fn test_plays_page_maps_sessions() {
        let page = plays_page("tomusher", PLAYS_XML, year_2014()).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.raw_len, 3);
        assert_eq!(page.plays.len(), 2);

        let first = &page.plays[0];
        assert_eq!(first.id, 101);
        assert_eq!(first.user, "tomusher");
        assert_eq!(first.game_id, 13);
        assert_eq!(first.game_name, "Catan");
        assert_eq!(first.length_minutes, 90);
        assert_eq!(first.location.as_deref(), Some("Aberystwyth"));
        assert!(!first.incomplete);

        let second = &page.plays[1];
        assert_eq!(second.game_id, 325);
        assert_eq!(second.quantity, 2);
        assert!(second.location.is_none());
        assert!(second.incomplete);
    }

    #[test]
    fn test_plays_page_invalid_user_is_empty() {
        let xml = "<div class='messagebox error'>\n\t\tInvalid object or user\n\t</div>";
        let page = plays_page("ghost", xml, year_2014()).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.plays.is_empty());
    }

    #[test]
    fn test_plays_page_empty_body() {
        let page = plays_page("ghost", "  ", year_2014()).unwrap();
        assert!(page.plays.is_empty());
    }

    #[test]
    fn test_plays_page_drops_out_of_range() {
        let xml = r#"<plays username="a" total="1" page="1">
  <play id="1" date="2015-01-05" quantity="1" length="0" incomplete="0" location="">
    <item name="Catan" objecttype="thing" objectid="13"/>
  </play>
</plays>"#;
        let page = plays_page("a", xml, year_2014()).unwrap();
        assert_eq!(page.raw_len, 1);
        assert!(page.plays.is_empty());
    }

    #[test]
    fn test_game_base_and_expansion() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <item type="boardgame" id="13">
    <thumbnail>https://cf.geekdo-images.com/t/13.jpg</thumbnail>
    <image>https://cf.geekdo-images.com/i/13.jpg</image>
    <name type="primary" sortindex="1" value="Catan"/>
    <name type="alternate" sortindex="1" value="Die Siedler von Catan"/>
    <description>Trade, build, settle.</description>
    <yearpublished value="1995"/>
    <link type="boardgamecategory" id="1021" value="Economic"/>
    <link type="boardgameexpansion" id="325" value="Catan: Seafarers"/>
  </item>
</items>"#;
        let game = game(13, xml).unwrap();
        assert_eq!(game.name, "Catan");
        assert!(!game.expansion);
        assert_eq!(
            game.image_url.as_deref(),
            Some("https://cf.geekdo-images.com/i/13.jpg")
        );
        assert_eq!(game.year_published, Some(1995));

        let xml = r#"<items><item type="boardgameexpansion" id="9999">
    <name type="primary" sortindex="1" value="Catan: Seafarers"/>
  </item></items>"#;
        let expansion = super::game(9999, xml).unwrap();
        assert!(expansion.expansion);
        assert!(expansion.image_url.is_none());
    }

    #[test]
    fn test_game_missing_is_not_found() {
        let err = game(42, "<items termsofuse=\"x\"></items>").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_absolute_image_url() {
        assert_eq!(
            absolute_image_url("//cf.geekdo-images.com/images/pic2419375.jpg"),
            "https://cf.geekdo-images.com/images/pic2419375.jpg"
        );
        assert_eq!(absolute_image_url("https://x/y.png"), "https://x/y.png");
    }
}

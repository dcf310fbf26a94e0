//! Static lookup tables for the three catalog categories
//!
//! Each category maps to a remote path segment, a section title, the fields shown
//! on its summary card and detail view, and a table of known images.

use serde::{Deserialize, Serialize};

/// A top-level resource kind of the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    People,
    Vehicles,
    Planets,
}

/// A single displayed property of a detail record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Human-readable label
    pub label: &'static str,
    /// Key in the record's `properties`
    pub key: &'static str,
    /// Unit appended after the value, if any
    pub unit: Option<&'static str>,
}

/// Presentation schema for one category
#[derive(Debug)]
pub struct CategorySchema {
    /// Section heading on the home view
    pub title: &'static str,
    /// Fields shown on the summary card
    pub card_fields: &'static [FieldSpec],
    /// Fields shown on the detail view, in order
    pub detail_fields: &'static [FieldSpec],
    /// Image used when no per-item image is known
    pub default_image: &'static str,
    /// Known images keyed by uid
    pub images: &'static [(&'static str, &'static str)],
}

const fn field(label: &'static str, key: &'static str, unit: Option<&'static str>) -> FieldSpec {
    FieldSpec { label, key, unit }
}

static PEOPLE: CategorySchema = CategorySchema {
    title: "Characters",
    card_fields: &[
        field("Gender", "gender", None),
        field("Hair Color", "hair_color", None),
        field("Eye Color", "eye_color", None),
    ],
    detail_fields: &[
        field("Height", "height", Some("cm")),
        field("Mass", "mass", Some("kg")),
        field("Hair Color", "hair_color", None),
        field("Skin Color", "skin_color", None),
        field("Eye Color", "eye_color", None),
        field("Birth Year", "birth_year", None),
        field("Gender", "gender", None),
    ],
    default_image: "https://lumiere-a.akamaihd.net/v1/images/star-wars-character_25fitdr3.jpeg",
    images: &[
        ("1", "https://lumiere-a.akamaihd.net/v1/images/luke-skywalker-main_fb34a1ff.jpeg"),
        ("2", "https://lumiere-a.akamaihd.net/v1/images/c-3po-main_417a2902.jpeg"),
        ("3", "https://lumiere-a.akamaihd.net/v1/images/r2-d2-main_86916bb6.jpeg"),
        ("4", "https://lumiere-a.akamaihd.net/v1/images/Darth-Vader_6bda9114.jpeg"),
        ("5", "https://lumiere-a.akamaihd.net/v1/images/leia-organa-feature-image_d0f5e953.jpeg"),
        ("6", "https://lumiere-a.akamaihd.net/v1/images/owen-lars-main_08c717c8.jpeg"),
        ("7", "https://lumiere-a.akamaihd.net/v1/images/databank_berulars_01_169_68101518.jpeg"),
        ("8", "https://lumiere-a.akamaihd.net/v1/images/r5-d4_main_image_7d5f078e.jpeg"),
        ("9", "https://lumiere-a.akamaihd.net/v1/images/image_606ff7f7.jpeg"),
        ("10", "https://lumiere-a.akamaihd.net/v1/images/obi-wan-kenobi-main_95f3a1a6.jpeg"),
    ],
};

static VEHICLES: CategorySchema = CategorySchema {
    title: "Vehicles",
    card_fields: &[field("Model", "model", None)],
    detail_fields: &[
        field("Model", "model", None),
        field("Manufacturer", "manufacturer", None),
        field("Cost", "cost_in_credits", Some("credits")),
        field("Length", "length", Some("m")),
        field("Crew", "crew", None),
        field("Passengers", "passengers", None),
        field("Cargo Capacity", "cargo_capacity", Some("kg")),
    ],
    default_image: "https://lumiere-a.akamaihd.net/v1/images/resistance-a-wing-main_11df4b87.jpeg",
    images: &[
        ("4", "https://lumiere-a.akamaihd.net/v1/images/sandcrawler-main_22404c03.jpeg"),
        ("6", "https://lumiere-a.akamaihd.net/v1/images/databank_rebelsnowspeeder_01_169_5d670434.jpeg"),
        ("7", "https://lumiere-a.akamaihd.net/v1/images/X-34-Landspeeder_8cfe5e72.jpeg"),
        ("8", "https://lumiere-a.akamaihd.net/v1/images/tie-fighter-main_01e5f79a.jpeg"),
        ("14", "https://lumiere-a.akamaihd.net/v1/images/snowspeeder_ef2f9334.jpeg"),
        ("16", "https://lumiere-a.akamaihd.net/v1/images/tempest-runner-main_9258f24d.jpeg"),
        ("18", "https://lumiere-a.akamaihd.net/v1/images/AT-AT_89d0105f.jpeg"),
        ("19", "https://lumiere-a.akamaihd.net/v1/images/AT-ST-main_f315b094.jpeg"),
        ("20", "https://lumiere-a.akamaihd.net/v1/images/databank_stormtrooperspeederbiketransport_79544f0d.jpeg"),
    ],
};

static PLANETS: CategorySchema = CategorySchema {
    title: "Planets",
    card_fields: &[field("Climate", "climate", None)],
    detail_fields: &[
        field("Diameter", "diameter", Some("km")),
        field("Rotation Period", "rotation_period", Some("hours")),
        field("Orbital Period", "orbital_period", Some("days")),
        field("Gravity", "gravity", None),
        field("Population", "population", None),
        field("Climate", "climate", None),
        field("Terrain", "terrain", None),
    ],
    default_image: "https://lumiere-a.akamaihd.net/v1/images/databank_felucia_01_169_2070f16a.jpeg",
    images: &[
        ("1", "https://lumiere-a.akamaihd.net/v1/images/tatooine-main_9542b896.jpeg"),
        ("2", "https://lumiere-a.akamaihd.net/v1/images/databank_alderaan_01_169_4a5264e2.jpeg"),
        ("3", "https://lumiere-a.akamaihd.net/v1/images/databank_yavin4_01_169_b6945e20.jpeg"),
        ("4", "https://lumiere-a.akamaihd.net/v1/images/Hoth_d074d307.jpeg"),
        ("5", "https://lumiere-a.akamaihd.net/v1/images/Dagobah_890df592.jpeg"),
        ("6", "https://lumiere-a.akamaihd.net/v1/images/databank_bespin_01_169_c533d6c6.jpeg"),
        ("7", "https://lumiere-a.akamaihd.net/v1/images/databank_endor_01_169_68ba9bdc.jpeg"),
        ("8", "https://lumiere-a.akamaihd.net/v1/images/databank_naboo_01_169_6cd7e1e0.jpeg"),
        ("9", "https://lumiere-a.akamaihd.net/v1/images/databank_coruscant_01_169_4d4b26cf.jpeg"),
        ("10", "https://lumiere-a.akamaihd.net/v1/images/kamino-main_3001369e.jpeg"),
    ],
};

impl CategoryKind {
    /// All categories in display and load order
    pub const ALL: [CategoryKind; 3] = [
        CategoryKind::People,
        CategoryKind::Vehicles,
        CategoryKind::Planets,
    ];

    /// Remote resource path segment (`people`, `vehicles`, `planets`)
    pub fn path_segment(self) -> &'static str {
        match self {
            CategoryKind::People => "people",
            CategoryKind::Vehicles => "vehicles",
            CategoryKind::Planets => "planets",
        }
    }

    /// Position in [`ALL`](Self::ALL)
    pub fn index(self) -> usize {
        match self {
            CategoryKind::People => 0,
            CategoryKind::Vehicles => 1,
            CategoryKind::Planets => 2,
        }
    }

    /// Presentation schema for this category
    pub fn schema(self) -> &'static CategorySchema {
        match self {
            CategoryKind::People => &PEOPLE,
            CategoryKind::Vehicles => &VEHICLES,
            CategoryKind::Planets => &PLANETS,
        }
    }

    /// Section heading on the home view
    pub fn title(self) -> &'static str {
        self.schema().title
    }

    /// Image for an item, falling back to the category default
    pub fn image_url(self, uid: &str) -> &'static str {
        let schema = self.schema();
        schema
            .images
            .iter()
            .find(|(id, _)| *id == uid)
            .map(|(_, url)| *url)
            .unwrap_or(schema.default_image)
    }

    /// Key of this category's listing in the timestamped cache
    pub fn catalog_key(self) -> String {
        format!("catalog:{}", self.path_segment())
    }

    /// Next category, wrapping after the last
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous category, wrapping before the first
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

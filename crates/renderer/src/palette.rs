//! Color scales for each exported map category.
//!
//! Every function here is a pure classification from a copied tile value to
//! a color. Scalar attributes (rainfall, savagery, ...) are on a 0-100 scale.

use map_common::{BiomeType, SiteKind, Stance, WaterFeature};

use crate::color::{interpolate_color, ramp, Rgb};

/// Temperature color scale (in-game degrees).
///
/// -50: deep purple, -30: blue, 0: cyan, 10: green, 20: yellow,
/// 30: orange, 40: red, 50 and above: dark red.
pub fn temperature_color(temperature: i16) -> Rgb {
    const STOPS: [(f32, Rgb); 8] = [
        (-50.0, Rgb::new(25, 0, 76)),
        (-30.0, Rgb::new(0, 0, 255)),
        (0.0, Rgb::new(0, 255, 255)),
        (10.0, Rgb::new(0, 255, 0)),
        (20.0, Rgb::new(255, 255, 0)),
        (30.0, Rgb::new(255, 165, 0)),
        (40.0, Rgb::new(255, 0, 0)),
        (50.0, Rgb::new(139, 0, 0)),
    ];
    ramp(&STOPS, temperature as f32)
}

/// Rainfall: dry tan to saturated dark blue.
pub fn rainfall_color(rainfall: u8) -> Rgb {
    const STOPS: [(f32, Rgb); 5] = [
        (0.0, Rgb::new(210, 180, 140)),
        (25.0, Rgb::new(255, 255, 150)),
        (50.0, Rgb::new(173, 255, 47)),
        (75.0, Rgb::new(100, 200, 255)),
        (100.0, Rgb::new(25, 50, 200)),
    ];
    ramp(&STOPS, rainfall as f32)
}

/// Drainage: waterlogged dark brown to free-draining pale sand.
pub fn drainage_color(drainage: u8) -> Rgb {
    interpolate_color(Rgb::new(60, 40, 20), Rgb::new(240, 220, 170), drainage as f32 / 100.0)
}

/// Savagery: calm green, wild yellow, savage red. Bands split at 33 and 66.
pub fn savagery_color(savagery: u8) -> Rgb {
    match savagery {
        0..=32 => interpolate_color(Rgb::new(0, 100, 0), Rgb::new(120, 200, 60), savagery as f32 / 33.0),
        33..=65 => interpolate_color(
            Rgb::new(200, 200, 0),
            Rgb::new(255, 140, 0),
            (savagery - 33) as f32 / 33.0,
        ),
        _ => interpolate_color(
            Rgb::new(255, 60, 0),
            Rgb::new(140, 0, 0),
            (savagery.min(100) - 66) as f32 / 34.0,
        ),
    }
}

/// Volcanism: cold black rock through glowing orange.
pub fn volcanism_color(volcanism: u8) -> Rgb {
    const STOPS: [(f32, Rgb); 3] = [
        (0.0, Rgb::new(20, 20, 20)),
        (60.0, Rgb::new(160, 30, 0)),
        (100.0, Rgb::new(255, 200, 0)),
    ];
    ramp(&STOPS, volcanism as f32)
}

/// Vegetation: barren brown to dense dark green.
pub fn vegetation_color(vegetation: u8) -> Rgb {
    const STOPS: [(f32, Rgb); 3] = [
        (0.0, Rgb::new(150, 110, 60)),
        (40.0, Rgb::new(140, 200, 80)),
        (100.0, Rgb::new(0, 80, 0)),
    ];
    ramp(&STOPS, vegetation as f32)
}

/// Evilness: good (blue), neutral (gray) and evil (purple) bands split at 33 and 66.
pub fn evilness_color(evilness: u8) -> Rgb {
    match evilness {
        0..=32 => interpolate_color(Rgb::new(0, 120, 255), Rgb::new(150, 200, 255), evilness as f32 / 33.0),
        33..=65 => Rgb::gray(128 + (evilness - 33) * 2),
        _ => interpolate_color(
            Rgb::new(160, 0, 160),
            Rgb::new(60, 0, 60),
            (evilness.min(100) - 66) as f32 / 34.0,
        ),
    }
}

/// Salinity: fresh white to briny teal.
pub fn salinity_color(salinity: u8) -> Rgb {
    interpolate_color(Rgb::new(245, 245, 245), Rgb::new(0, 110, 120), salinity as f32 / 100.0)
}

/// Elevation: ocean depths in blues, land from green lowlands to snowy peaks.
pub fn elevation_color(elevation: i16) -> Rgb {
    if elevation < 0 {
        const OCEAN: [(f32, Rgb); 3] = [
            (-100.0, Rgb::new(0, 0, 60)),
            (-30.0, Rgb::new(0, 40, 150)),
            (0.0, Rgb::new(60, 120, 220)),
        ];
        return ramp(&OCEAN, elevation as f32);
    }
    const LAND: [(f32, Rgb); 5] = [
        (0.0, Rgb::new(40, 140, 40)),
        (100.0, Rgb::new(150, 200, 80)),
        (200.0, Rgb::new(200, 170, 90)),
        (300.0, Rgb::new(120, 90, 60)),
        (400.0, Rgb::new(250, 250, 250)),
    ];
    ramp(&LAND, elevation as f32)
}

/// Color for surface water, or `None` for dry land.
pub fn water_color(water: WaterFeature) -> Option<Rgb> {
    match water {
        WaterFeature::None => None,
        WaterFeature::River => Some(Rgb::new(80, 160, 255)),
        WaterFeature::Lake => Some(Rgb::new(30, 90, 230)),
        WaterFeature::Ocean => Some(Rgb::new(0, 40, 150)),
    }
}

/// Elevation with rivers and lakes painted on top.
pub fn elevation_water_color(elevation: i16, water: WaterFeature) -> Rgb {
    water_color(water).unwrap_or_else(|| elevation_color(elevation))
}

/// Hydrology: water features in blue over a dim gray relief.
pub fn hydrology_color(elevation: i16, water: WaterFeature) -> Rgb {
    water_color(water).unwrap_or_else(|| relief_gray(elevation))
}

/// Neutral gray relief used as the background of overlay maps.
pub fn relief_gray(elevation: i16) -> Rgb {
    if elevation < 0 {
        return Rgb::new(10, 20, 50);
    }
    let level = 40.0 + (elevation.min(400) as f32 / 400.0) * 120.0;
    Rgb::gray(level as u8)
}

/// Background for overlay maps: dark sea, gray land relief.
pub fn overlay_background(elevation: i16, water: WaterFeature) -> Rgb {
    match water {
        WaterFeature::Ocean => Rgb::new(10, 20, 50),
        WaterFeature::Lake | WaterFeature::River => Rgb::new(30, 50, 90),
        WaterFeature::None => relief_gray(elevation),
    }
}

/// Biome table.
pub fn biome_color(biome: BiomeType) -> Rgb {
    use BiomeType::*;
    match biome {
        Mountain => Rgb::new(128, 128, 128),
        Glacier => Rgb::new(230, 255, 255),
        Tundra => Rgb::new(190, 210, 200),
        TemperateFreshwaterSwamp => Rgb::new(96, 192, 128),
        TemperateSaltwaterSwamp => Rgb::new(64, 160, 128),
        TemperateFreshwaterMarsh => Rgb::new(96, 255, 128),
        TemperateSaltwaterMarsh => Rgb::new(64, 224, 128),
        TropicalFreshwaterSwamp => Rgb::new(96, 192, 64),
        TropicalSaltwaterSwamp => Rgb::new(64, 160, 64),
        Mangrove => Rgb::new(64, 255, 96),
        TropicalFreshwaterMarsh => Rgb::new(96, 255, 64),
        TropicalSaltwaterMarsh => Rgb::new(64, 224, 64),
        TaigaForest => Rgb::new(0, 96, 64),
        TemperateConiferForest => Rgb::new(0, 96, 32),
        TemperateBroadleafForest => Rgb::new(0, 160, 32),
        TropicalConiferForest => Rgb::new(0, 96, 0),
        TropicalDryBroadleafForest => Rgb::new(0, 128, 0),
        TropicalMoistBroadleafForest => Rgb::new(0, 160, 0),
        TemperateGrassland => Rgb::new(0, 255, 32),
        TemperateSavanna => Rgb::new(0, 224, 32),
        TemperateShrubland => Rgb::new(0, 192, 32),
        TropicalGrassland => Rgb::new(255, 160, 0),
        TropicalSavanna => Rgb::new(255, 176, 0),
        TropicalShrubland => Rgb::new(255, 192, 0),
        BadlandDesert => Rgb::new(255, 96, 32),
        RockyDesert => Rgb::new(255, 224, 160),
        SandDesert => Rgb::new(255, 255, 0),
        ArcticOcean => Rgb::new(224, 224, 255),
        TemperateOcean => Rgb::new(0, 0, 255),
        TropicalOcean => Rgb::new(0, 0, 160),
        TemperateFreshwaterLake => Rgb::new(0, 224, 255),
        TemperateBrackishLake => Rgb::new(0, 192, 255),
        TemperateSaltwaterLake => Rgb::new(0, 160, 255),
        TropicalFreshwaterLake => Rgb::new(0, 96, 255),
        TropicalBrackishLake => Rgb::new(0, 64, 255),
        TropicalSaltwaterLake => Rgb::new(0, 32, 255),
        TemperateFreshwaterRiver => Rgb::new(0, 255, 255),
        TemperateBrackishRiver => Rgb::new(0, 224, 224),
        TemperateSaltwaterRiver => Rgb::new(0, 192, 192),
        TropicalFreshwaterRiver => Rgb::new(0, 160, 160),
        TropicalBrackishRiver => Rgb::new(0, 128, 128),
        TropicalSaltwaterRiver => Rgb::new(0, 96, 96),
        Subterranean => Rgb::new(64, 32, 0),
    }
}

/// Footprint color of a site on the sites map.
pub fn site_color(kind: SiteKind) -> Rgb {
    match kind {
        SiteKind::PlayerFortress => Rgb::new(255, 255, 255),
        SiteKind::DarkFortress => Rgb::new(80, 0, 80),
        SiteKind::Cave => Rgb::new(90, 60, 30),
        SiteKind::MountainHall => Rgb::new(200, 200, 200),
        SiteKind::ForestRetreat => Rgb::new(0, 200, 90),
        SiteKind::Town => Rgb::new(255, 220, 0),
        SiteKind::Hamlet => Rgb::new(230, 180, 60),
        SiteKind::ImportantLocation => Rgb::new(255, 0, 255),
        SiteKind::Lair => Rgb::new(160, 0, 0),
        SiteKind::Fortress => Rgb::new(180, 180, 255),
        SiteKind::Camp => Rgb::new(255, 120, 0),
        SiteKind::Monument => Rgb::new(140, 140, 200),
        SiteKind::Shrine => Rgb::new(255, 255, 160),
        SiteKind::Tower => Rgb::new(40, 40, 40),
        SiteKind::Monastery => Rgb::new(120, 200, 255),
        SiteKind::Tomb => Rgb::new(110, 90, 90),
    }
}

/// Center and border colors of a line on an overlay map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub center: Rgb,
    pub border: Rgb,
}

pub const TRADE_LINE: LineStyle = LineStyle {
    center: Rgb::new(255, 215, 0),
    border: Rgb::new(0, 0, 0),
};

pub const NOBILITY_LINE: LineStyle = LineStyle {
    center: Rgb::new(190, 0, 255),
    border: Rgb::new(0, 0, 0),
};

pub fn diplomacy_line(stance: Stance) -> LineStyle {
    let center = match stance {
        Stance::Peace => Rgb::new(0, 220, 0),
        Stance::Alliance => Rgb::new(0, 140, 255),
        Stance::War => Rgb::new(255, 0, 0),
    };
    LineStyle {
        center,
        border: Rgb::new(0, 0, 0),
    }
}

/// Marker drawn at each site position on link maps.
pub const SITE_MARKER: Rgb = Rgb::new(255, 255, 255);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_stops() {
        assert_eq!(temperature_color(-80), Rgb::new(25, 0, 76));
        assert_eq!(temperature_color(0), Rgb::new(0, 255, 255));
        assert_eq!(temperature_color(20), Rgb::new(255, 255, 0));
        assert_eq!(temperature_color(90), Rgb::new(139, 0, 0));
    }

    #[test]
    fn test_scalar_ramps_hit_endpoints() {
        assert_eq!(rainfall_color(0), Rgb::new(210, 180, 140));
        assert_eq!(rainfall_color(100), Rgb::new(25, 50, 200));
        assert_eq!(drainage_color(0), Rgb::new(60, 40, 20));
        assert_eq!(drainage_color(100), Rgb::new(240, 220, 170));
        assert_eq!(salinity_color(0), Rgb::new(245, 245, 245));
        assert_eq!(vegetation_color(100), Rgb::new(0, 80, 0));
        assert_eq!(volcanism_color(100), Rgb::new(255, 200, 0));
    }

    #[test]
    fn test_band_classifiers_do_not_overflow() {
        for v in 0..=u8::MAX {
            let _ = savagery_color(v);
            let _ = evilness_color(v);
        }
        assert_eq!(evilness_color(33), Rgb::gray(128));
    }

    #[test]
    fn test_elevation_sea_and_land_differ() {
        let sea = elevation_color(-10);
        let land = elevation_color(10);
        assert!(sea.b > sea.g);
        assert!(land.g > land.b);
        assert_eq!(elevation_color(1000), Rgb::new(250, 250, 250));
    }

    #[test]
    fn test_water_overrides_elevation() {
        assert_eq!(
            elevation_water_color(150, WaterFeature::River),
            Rgb::new(80, 160, 255)
        );
        assert_eq!(elevation_water_color(150, WaterFeature::None), elevation_color(150));
        assert_eq!(hydrology_color(0, WaterFeature::None), Rgb::gray(40));
    }

    #[test]
    fn test_diplomacy_colors_distinct() {
        let peace = diplomacy_line(Stance::Peace).center;
        let war = diplomacy_line(Stance::War).center;
        let alliance = diplomacy_line(Stance::Alliance).center;
        assert_ne!(peace, war);
        assert_ne!(peace, alliance);
        assert_ne!(war, alliance);
    }
}

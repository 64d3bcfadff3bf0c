use glam::Vec2;

/// What a brush application does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrushKind {
    Raise,
    Lower,
    Flatten,
    Smooth,
    Noise,
    Paint,
    Erase,
}

impl BrushKind {
    pub const ALL: [BrushKind; 7] = [
        BrushKind::Raise,
        BrushKind::Lower,
        BrushKind::Flatten,
        BrushKind::Smooth,
        BrushKind::Noise,
        BrushKind::Paint,
        BrushKind::Erase,
    ];

    /// Sculpting brushes edit heights; the rest edit splat weights.
    pub fn edits_height(self) -> bool {
        !matches!(self, BrushKind::Paint | BrushKind::Erase)
    }

    pub fn name(self) -> &'static str {
        match self {
            BrushKind::Raise => "raise",
            BrushKind::Lower => "lower",
            BrushKind::Flatten => "flatten",
            BrushKind::Smooth => "smooth",
            BrushKind::Noise => "noise",
            BrushKind::Paint => "paint",
            BrushKind::Erase => "erase",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// One brush application, built per input event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushParams {
    /// World-space XZ center.
    pub center: Vec2,
    /// World-space radius.
    pub radius: f32,
    /// Height units per application for raise/lower/noise, blend amount in
    /// `[0, 1]` for flatten/smooth/paint/erase.
    pub strength: f32,
    pub kind: BrushKind,
    /// Texture-set index for paint and erase.
    pub texture_index: u8,
}

impl BrushParams {
    pub fn new(kind: BrushKind, center: Vec2, radius: f32, strength: f32) -> Self {
        Self {
            center,
            radius,
            strength,
            kind,
            texture_index: 0,
        }
    }

    pub fn with_texture(mut self, texture_index: u8) -> Self {
        self.texture_index = texture_index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in BrushKind::ALL {
            assert_eq!(BrushKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BrushKind::from_name("FLATTEN"), Some(BrushKind::Flatten));
        assert_eq!(BrushKind::from_name("erode"), None);
    }

    #[test]
    fn test_height_kinds() {
        let height: Vec<_> = BrushKind::ALL.into_iter().filter(|k| k.edits_height()).collect();
        assert_eq!(height.len(), 5);
        assert!(!BrushKind::Paint.edits_height());
    }
}

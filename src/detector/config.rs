use std::fmt;

use crate::error::AppError;

/// Compound scaling level, D0 through D7.
///
/// Each level fixes the input resolution, the backbone and the feature
/// fusion dimensions of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingLevel {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
}

impl ScalingLevel {
    pub const ALL: [ScalingLevel; 8] = [
        Self::D0,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
    ];

    /// Side length of the square network input.
    pub fn input_size(self) -> u32 {
        match self {
            Self::D0 => 512,
            Self::D1 => 640,
            Self::D2 => 768,
            Self::D3 => 896,
            Self::D4 => 1024,
            Self::D5 => 1280,
            Self::D6 => 1280,
            Self::D7 => 1536,
        }
    }

    /// Feature extraction backbone paired with this level.
    pub fn backbone(self) -> &'static str {
        match self {
            Self::D0 => "efficientnet-b0",
            Self::D1 => "efficientnet-b1",
            Self::D2 => "efficientnet-b2",
            Self::D3 => "efficientnet-b3",
            Self::D4 => "efficientnet-b4",
            Self::D5 => "efficientnet-b5",
            Self::D6 => "efficientnet-b6",
            Self::D7 => "efficientnet-b7",
        }
    }

    /// Channel width of the feature fusion stage.
    pub fn fusion_width(self) -> u32 {
        match self {
            Self::D0 => 64,
            Self::D1 => 88,
            Self::D2 => 112,
            Self::D3 => 160,
            Self::D4 => 224,
            Self::D5 => 288,
            Self::D6 => 384,
            Self::D7 => 384,
        }
    }

    /// Number of stacked feature fusion layers.
    pub fn fusion_depth(self) -> u32 {
        match self {
            Self::D0 => 3,
            Self::D1 => 4,
            Self::D2 => 5,
            Self::D3 => 6,
            Self::D4 => 7,
            Self::D5 => 7,
            Self::D6 => 8,
            Self::D7 => 8,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ScalingLevel {
    type Error = AppError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::ALL.get(value as usize).copied().ok_or_else(|| {
            AppError::Config(format!(
                "Unsupported EfficientDet level {value}, expected 0 through 7"
            ))
        })
    }
}

impl fmt::Display for ScalingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.index())
    }
}

/// Architecture parameters the detector is constructed with.
#[derive(Debug, Clone)]
pub struct EfficientDetConfig {
    /// Number of classes in the resolved taxonomy
    pub num_classes: usize,

    /// Compound scaling level
    pub level: ScalingLevel,

    /// Bidirectional feature fusion, top-down only when false
    pub bidirectional: bool,
}

impl EfficientDetConfig {
    pub fn new(num_classes: usize, level: ScalingLevel, bidirectional: bool) -> Self {
        Self {
            num_classes,
            level,
            bidirectional,
        }
    }

    /// Side length of the square network input.
    pub fn input_size(&self) -> u32 {
        self.level.input_size()
    }
}

impl fmt::Display for EfficientDetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fusion = if self.bidirectional { "BiFPN" } else { "FPN" };
        write!(
            f,
            "EfficientDet-{} ({}, {}x{} input, {} w{} d{}, {} classes)",
            self.level,
            self.level.backbone(),
            self.input_size(),
            self.input_size(),
            fusion,
            self.level.fusion_width(),
            self.level.fusion_depth(),
            self.num_classes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_levels_roundtrip_through_index() {
        for value in 0..=7u8 {
            let level = ScalingLevel::try_from(value).unwrap();
            assert_eq!(level.index(), value);
        }
    }

    #[test]
    fn test_out_of_range_levels_rejected() {
        assert!(ScalingLevel::try_from(8).is_err());
        assert!(ScalingLevel::try_from(9).is_err());
        assert!(ScalingLevel::try_from(255).is_err());
    }

    #[test]
    fn test_input_sizes_grow_with_level() {
        assert_eq!(ScalingLevel::D0.input_size(), 512);
        assert_eq!(ScalingLevel::D3.input_size(), 896);
        // D5 and D6 share a resolution, D7 grows again
        assert_eq!(ScalingLevel::D5.input_size(), 1280);
        assert_eq!(ScalingLevel::D6.input_size(), 1280);
        assert_eq!(ScalingLevel::D7.input_size(), 1536);
    }

    #[test]
    fn test_config_summary_names_fusion_topology() {
        let config = EfficientDetConfig::new(20, ScalingLevel::D0, true);
        let summary = config.to_string();
        assert!(summary.contains("BiFPN"));
        assert!(summary.contains("efficientnet-b0"));
        assert!(summary.contains("20 classes"));

        let config = EfficientDetConfig::new(3, ScalingLevel::D2, false);
        assert!(config.to_string().contains("FPN"));
        assert!(!config.to_string().contains("BiFPN"));
    }
}

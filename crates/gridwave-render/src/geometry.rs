// crates/gridwave-render/src/geometry.rs
use bitflags::bitflags;

bitflags! {
    /// Inline style properties the engine owns on items.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GeometryProps: u8 {
        const POSITION = 1 << 0;
        const WIDTH    = 1 << 1;
        const LEFT     = 1 << 2;
        const TOP      = 1 << 3;
        const HEIGHT   = 1 << 4;
    }
}

impl GeometryProps {
    /// CSS property names of the set flags.
    pub fn css_names(self) -> impl Iterator<Item = &'static str> {
        self.iter().map(|flag| {
            if flag == GeometryProps::POSITION {
                "position"
            } else if flag == GeometryProps::WIDTH {
                "width"
            } else if flag == GeometryProps::LEFT {
                "left"
            } else if flag == GeometryProps::TOP {
                "top"
            } else {
                "height"
            }
        })
    }
}

use crate::vec::{Color3, Vec2u};

#[derive(Debug, Clone)]
pub struct Array2d<T> {
    data: Vec<T>,
    size_x: u32,
    size_y: u32,
}

impl<T: Clone> Array2d<T> {
    pub fn with_size(size_x: u32, size_y: u32, value: T) -> Self {
        let mut m_data = Vec::with_capacity((size_x * size_y) as usize);
        m_data.resize((size_x * size_y) as usize, value);
        Self {
            data: m_data,
            size_x,
            size_y,
        }
    }

    #[must_use]
    pub const fn get_index_1d(&self, x: u32, y: u32) -> usize {
        y as usize * self.size_x as usize + x as usize
    }

    #[must_use]
    pub const fn size_x(&self) -> u32 {
        self.size_x
    }

    #[must_use]
    pub const fn size_y(&self) -> u32 {
        self.size_y
    }

    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> &T {
        &self.data[self.get_index_1d(x, y)]
    }

    pub fn at_mut(&mut self, x: u32, y: u32) -> &mut T {
        let index = self.get_index_1d(x, y);
        &mut self.data[index]
    }

    /// Copy `block` into this array with its top-left corner at `pos`
    pub fn blit(&mut self, pos: Vec2u, block: &Self) {
        for x in 0..block.size_x {
            for y in 0..block.size_y {
                *self.at_mut(x + pos.x, y + pos.y) = block.at(x, y).clone();
            }
        }
    }
}

impl Array2d<Color3> {
    /// Number of pixels holding a NaN/Inf value
    #[must_use]
    pub fn count_invalid(&self) -> usize {
        self.data
            .iter()
            .filter(|c| !(c.x.is_finite() && c.y.is_finite() && c.z.is_finite()))
            .count()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.count_invalid() == 0
    }
}

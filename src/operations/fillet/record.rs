use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Point3;

use super::CrossingType;

/// Persisted fields of a [`FilletConfig`](super::FilletConfig).
///
/// `pick_points` is present exactly when the configuration has not been
/// initialized yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilletConfigRecord {
    pub is_incoming: [bool; 2],
    pub crossing_type: CrossingType,
    pub params: [f64; 2],
    pub arc_end_points: [Point3; 2],
    pub intersection_point: Option<Point3>,
    pub pick_points: Option<[Point3; 2]>,
}

/// Sink for the persisted field set.
pub trait FieldWriter {
    fn write_bool(&mut self, value: bool);
    fn write_i32(&mut self, value: i32);
    fn write_f64(&mut self, value: f64);

    fn write_point(&mut self, point: &Point3) {
        self.write_f64(point.x);
        self.write_f64(point.y);
        self.write_f64(point.z);
    }
}

/// Source of the persisted field set.
pub trait FieldReader {
    /// # Errors
    ///
    /// Returns an error if the field is missing.
    fn read_bool(&mut self) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error if the field is missing.
    fn read_i32(&mut self) -> Result<i32>;

    /// # Errors
    ///
    /// Returns an error if the field is missing.
    fn read_f64(&mut self) -> Result<f64>;

    /// # Errors
    ///
    /// Returns an error if any coordinate is missing.
    fn read_point(&mut self) -> Result<Point3> {
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        let z = self.read_f64()?;
        Ok(Point3::new(x, y, z))
    }
}

impl FilletConfigRecord {
    /// Writes the fields in their fixed order.
    pub fn write_fields<W: FieldWriter + ?Sized>(&self, writer: &mut W) {
        writer.write_bool(self.is_incoming[0]);
        writer.write_bool(self.is_incoming[1]);
        writer.write_i32(self.crossing_type.code());
        writer.write_f64(self.params[0]);
        writer.write_f64(self.params[1]);
        writer.write_point(&self.arc_end_points[0]);
        writer.write_point(&self.arc_end_points[1]);

        writer.write_bool(self.intersection_point.is_some());
        if let Some(point) = &self.intersection_point {
            writer.write_point(point);
        }

        writer.write_bool(self.pick_points.is_none());
        if let Some([pick0, pick1]) = &self.pick_points {
            writer.write_point(pick0);
            writer.write_point(pick1);
        }
    }

    /// Reads the fields written by [`FilletConfigRecord::write_fields`].
    ///
    /// # Errors
    ///
    /// Returns the reader's error for a missing field, or
    /// [`PersistError::UnknownCrossingType`](crate::error::PersistError::UnknownCrossingType)
    /// for an invalid crossing code.
    pub fn read_fields<R: FieldReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let is_incoming = [reader.read_bool()?, reader.read_bool()?];
        let crossing_type = CrossingType::from_code(reader.read_i32()?)?;
        let params = [reader.read_f64()?, reader.read_f64()?];
        let arc_end_points = [reader.read_point()?, reader.read_point()?];
        let intersection_point = if reader.read_bool()? {
            Some(reader.read_point()?)
        } else {
            None
        };
        let pick_points = if reader.read_bool()? {
            None
        } else {
            Some([reader.read_point()?, reader.read_point()?])
        };
        Ok(Self {
            is_incoming,
            crossing_type,
            params,
            arc_end_points,
            intersection_point,
            pick_points,
        })
    }
}

use std::io::{Error, ErrorKind, Read, Result, Write};

use glam::{Quat, Vec2, Vec3, Vec4};

/// Extension trait for reading little-endian values from a reader
pub trait ReadExt: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i8(&mut self) -> Result<i8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(i8::from_le_bytes(buf))
    }

    fn read_i16_le(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_vec2_le(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32_le()?, self.read_f32_le()?))
    }

    fn read_vec3_le(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    fn read_vec4_le(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    /// Reads a quaternion stored in x, y, z, w field order.
    fn read_quat_xyzw_le(&mut self) -> Result<Quat> {
        let x = self.read_f32_le()?;
        let y = self.read_f32_le()?;
        let z = self.read_f32_le()?;
        let w = self.read_f32_le()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a fixed-width field and returns the string up to the first NUL.
    ///
    /// Rejects non-UTF-8 content; trailing padding bytes past the NUL are
    /// discarded.
    fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let buf = self.read_bytes(width)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        String::from_utf8(buf[..end].to_vec())
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("non-utf8 string: {e}")))
    }
}

/// Extension trait for writing little-endian values to a writer
pub trait WriteExt: Write {
    fn write_u8(&mut self, n: u8) -> Result<()> {
        self.write_all(&[n])
    }

    fn write_u16_le(&mut self, n: u16) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_u32_le(&mut self, n: u32) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_i8(&mut self, n: i8) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_i16_le(&mut self, n: i16) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_i32_le(&mut self, n: i32) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_f32_le(&mut self, n: f32) -> Result<()> {
        self.write_all(&n.to_le_bytes())
    }

    fn write_vec2_le(&mut self, v: Vec2) -> Result<()> {
        self.write_f32_le(v.x)?;
        self.write_f32_le(v.y)
    }

    fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
        self.write_f32_le(v.x)?;
        self.write_f32_le(v.y)?;
        self.write_f32_le(v.z)
    }

    fn write_vec4_le(&mut self, v: Vec4) -> Result<()> {
        self.write_f32_le(v.x)?;
        self.write_f32_le(v.y)?;
        self.write_f32_le(v.z)?;
        self.write_f32_le(v.w)
    }

    fn write_quat_xyzw_le(&mut self, q: Quat) -> Result<()> {
        self.write_f32_le(q.x)?;
        self.write_f32_le(q.y)?;
        self.write_f32_le(q.z)?;
        self.write_f32_le(q.w)
    }

    /// Writes a string into a fixed-width NUL-padded field.
    ///
    /// Fails if the string (plus its terminator) does not fit.
    fn write_fixed_string(&mut self, s: &str, width: usize) -> Result<()> {
        if s.len() >= width {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("string '{s}' does not fit in {width} byte field"),
            ));
        }
        self.write_all(s.as_bytes())?;
        self.write_all(&vec![0u8; width - s.len()])
    }
}

impl<R: Read + ?Sized> ReadExt for R {}
impl<W: Write + ?Sized> WriteExt for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn scalar_round_trip() {
        let mut buf = Vec::new();
        buf.write_u32_le(0xDEAD_BEEF).unwrap();
        buf.write_i32_le(-42).unwrap();
        buf.write_f32_le(1.5).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(cur.read_u32_le().unwrap(), 0xDEAD_BEEF);
        assert_eq!(cur.read_i32_le().unwrap(), -42);
        assert_eq!(cur.read_f32_le().unwrap(), 1.5);
    }

    #[test]
    fn fixed_string_pads_and_truncates_at_nul() {
        let mut buf = Vec::new();
        buf.write_fixed_string("glow", 8).unwrap();
        assert_eq!(buf.len(), 8);

        let mut cur = Cursor::new(buf);
        assert_eq!(cur.read_fixed_string(8).unwrap(), "glow");
    }

    #[test]
    fn fixed_string_rejects_overflow() {
        let mut buf = Vec::new();
        assert!(buf.write_fixed_string("12345678", 8).is_err());
    }

    #[test]
    fn short_read_errors() {
        let mut cur = Cursor::new(vec![0u8; 2]);
        assert!(cur.read_u32_le().is_err());
    }
}

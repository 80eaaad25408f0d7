use crate::utils::Result;

#[derive(Debug, PartialEq, Clone)]
pub struct GenomicRegion {
    pub contig: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicRegion {
    pub fn new(contig: impl Into<String>, start: u32, end: u32) -> Result<Self> {
        if start >= end {
            return Err(format!("Invalid region: start {} >= end {}", start, end));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    pub fn from_string(encoding: &str) -> Result<Self> {
        let error_msg = || format!("Invalid region encoding: {}", encoding);
        let elements: Vec<&str> = encoding.split(&[':', '-']).collect();

        if elements.len() != 3 {
            return Err(error_msg());
        }

        let start: u32 = elements[1].parse().map_err(|_| error_msg())?;
        let end: u32 = elements[2].parse().map_err(|_| error_msg())?;

        Self::new(elements[0].to_string(), start, end)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Translates a 1-based offset within the region into a 1-based
    /// position on the region's contig.
    pub fn genome_pos(&self, offset: u32) -> u32 {
        self.start + offset
    }
}

impl std::fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::GenomicRegion;

    #[test]
    fn init_region_from_valid_string_ok() {
        let region = GenomicRegion::from_string("chr1:100-200").unwrap();
        assert_eq!(region.contig, "chr1");
        assert_eq!(region.start, 100);
        assert_eq!(region.end, 200);
        assert_eq!(region.len(), 100);
    }

    #[test]
    fn init_region_from_invalid_string_err() {
        assert_eq!(
            GenomicRegion::from_string("chr:1:100-200"),
            Err("Invalid region encoding: chr:1:100-200".to_string())
        );
    }

    #[test]
    fn init_region_from_invalid_start_err() {
        assert_eq!(
            GenomicRegion::from_string("chr1:a-200"),
            Err("Invalid region encoding: chr1:a-200".to_string())
        );
    }

    #[test]
    fn init_region_from_invalid_interval_err() {
        assert_eq!(
            GenomicRegion::from_string("chr1:200-100"),
            Err("Invalid region: start 200 >= end 100".to_string())
        );
    }

    #[test]
    fn offset_translates_into_genome_position() {
        let region = GenomicRegion::from_string("chr2:1000-1100").unwrap();
        assert_eq!(region.genome_pos(1), 1001);
        assert_eq!(region.genome_pos(100), 1100);
    }
}

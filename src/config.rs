use crate::{
    error::{Error, Result},
    s3::{
        PartSizePolicy,
        limits::{MAX_PART_SIZE_BYTES, MIN_PART_SIZE_BYTES, PART_SIZE_DIVISOR, READ_SIZE_BYTES},
    },
    stream::PartSplitter,
};
use serde::Deserialize;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

/// Settings for backends with other limits than AWS
///
/// ```yaml
/// ---
/// min_part_size: 5242880
/// max_part_size: 5368709120
/// part_divisor: 9999
/// read_size: 1024
/// tmp_dir: /var/tmp
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_min_part_size")]
    pub min_part_size: u64,
    #[serde(default = "default_max_part_size")]
    pub max_part_size: u64,
    #[serde(default = "default_part_divisor")]
    pub part_divisor: u64,
    #[serde(default = "default_read_size")]
    pub read_size: usize,
    pub tmp_dir: Option<PathBuf>,
}

const fn default_min_part_size() -> u64 {
    MIN_PART_SIZE_BYTES
}

const fn default_max_part_size() -> u64 {
    MAX_PART_SIZE_BYTES
}

const fn default_part_divisor() -> u64 {
    PART_SIZE_DIVISOR
}

const fn default_read_size() -> usize {
    READ_SIZE_BYTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_part_size: MIN_PART_SIZE_BYTES,
            max_part_size: MAX_PART_SIZE_BYTES,
            part_divisor: PART_SIZE_DIVISOR,
            read_size: READ_SIZE_BYTES,
            tmp_dir: None,
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Will return `Err` if the file can not be read, parsed or has invalid values
    pub fn new(config_path: &Path) -> Result<Self> {
        let file = File::open(config_path).map_err(|source| Error::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml_ng::from_reader(file)?;
        config.validate()?;

        log::debug!("Config loaded from {}: {config:?}", config_path.display());

        Ok(config)
    }

    /// # Errors
    ///
    /// Will return `Err` if the YAML can not be parsed or has invalid values
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.policy()?;

        if self.read_size == 0 {
            return Err(Error::invalid_argument("read_size", "must be greater than 0"));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Will return `Err` if the part size limits are invalid
    pub fn policy(&self) -> Result<PartSizePolicy> {
        PartSizePolicy::new(self.min_part_size, self.max_part_size, self.part_divisor)
    }

    /// Splitter using `read_size` and `tmp_dir`
    ///
    /// # Errors
    ///
    /// Will return `Err` if `part_size` or `read_size` is 0
    pub fn splitter<R: Read>(&self, reader: R, part_size: u64) -> Result<PartSplitter<R>> {
        let splitter = PartSplitter::new(reader, part_size)?.with_read_size(self.read_size)?;

        Ok(match &self.tmp_dir {
            Some(dir) => splitter.with_tmp_dir(dir),
            None => splitter,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const CONF: &str = r"---
min_part_size: 1048576
max_part_size: 67108864
part_divisor: 1000
read_size: 4096
tmp_dir: /var/tmp";

    const CONF_PARTIAL: &str = r"---
max_part_size: 67108864";

    #[test]
    fn test_config_new() {
        let mut tmp_file = NamedTempFile::new().unwrap();
        tmp_file.write_all(CONF.as_bytes()).unwrap();

        let config = Config::new(tmp_file.path()).unwrap();
        assert_eq!(config.min_part_size, 1_048_576);
        assert_eq!(config.max_part_size, 67_108_864);
        assert_eq!(config.part_divisor, 1_000);
        assert_eq!(config.read_size, 4_096);
        assert_eq!(config.tmp_dir, Some(PathBuf::from("/var/tmp")));

        let policy = config.policy().unwrap();
        assert_eq!(policy.calculate(-1).unwrap(), 67_108_864);
        assert_eq!(policy.calculate(0).unwrap(), 1_048_576);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_yaml(CONF_PARTIAL).unwrap();
        assert_eq!(config.min_part_size, MIN_PART_SIZE_BYTES);
        assert_eq!(config.max_part_size, 67_108_864);
        assert_eq!(config.part_divisor, PART_SIZE_DIVISOR);
        assert_eq!(config.read_size, READ_SIZE_BYTES);
        assert!(config.tmp_dir.is_none());

        assert_eq!(Config::default().policy().unwrap(), PartSizePolicy::default());
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(
            Config::new(Path::new("/nonexistent/s3prep.yml")),
            Err(Error::ConfigRead { ref path, ref source })
                if path == Path::new("/nonexistent/s3prep.yml")
                    && source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_config_invalid() {
        assert!(matches!(
            Config::from_yaml("read_size: 0"),
            Err(Error::InvalidArgument { name: "read_size", .. })
        ));
        assert!(matches!(
            Config::from_yaml("min_part_size: 10\nmax_part_size: 5"),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            Config::from_yaml("part_size: 10"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_yaml("read_size: lots"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_config_splitter() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            read_size: 2,
            tmp_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let mut splitter = config.splitter(Cursor::new(b"hello".to_vec()), 4).unwrap();
        assert_eq!(splitter.read_size(), 2);

        let part = splitter.next_part().unwrap();
        assert_eq!(part.size(), 4);
        assert!(part.path().starts_with(dir.path()));
        assert_eq!(splitter.next_part().unwrap().size(), 1);
    }
}

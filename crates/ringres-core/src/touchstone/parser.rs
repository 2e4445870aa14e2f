//! Touchstone file parser
//!
//! Implements parsing of Touchstone v1 (`.sNp`) and v2 (`.ts` or keyword
//! based `.sNp`) network data. Noise parameter blocks are skipped.

use ndarray::Array3;
use num_complex::Complex64;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::frequency::{Frequency, FrequencyUnit};

/// Touchstone parsing errors
#[derive(Error, Debug)]
pub enum TouchstoneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid option line: {0}")]
    InvalidOption(String),

    #[error("Invalid file extension: expected .sNp or .ts format")]
    InvalidExtension,

    #[error("Number of ports unknown: .ts files need a [Number of Ports] keyword")]
    MissingPortCount,

    #[error("Unsupported parameter type {0:?}: only S-parameter files can be extracted")]
    UnsupportedParameter(ParameterType),

    #[error("Incomplete data: {0} trailing values do not form a full frequency point")]
    IncompleteData(usize),
}

/// Data pair format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SParamFormat {
    RI, // Real-Imaginary
    #[default]
    MA, // Magnitude-Angle (degrees)
    DB, // dB-Angle (degrees)
}

impl SParamFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RI" => Some(SParamFormat::RI),
            "MA" => Some(SParamFormat::MA),
            "DB" => Some(SParamFormat::DB),
            _ => None,
        }
    }

    /// Convert one value pair to a complex number
    fn to_complex(self, v1: f64, v2: f64) -> Complex64 {
        match self {
            SParamFormat::RI => Complex64::new(v1, v2),
            SParamFormat::MA => Complex64::from_polar(v1, v2.to_radians()),
            SParamFormat::DB => Complex64::from_polar(10.0_f64.powf(v1 / 20.0), v2.to_radians()),
        }
    }
}

/// Network parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterType {
    #[default]
    S,
    Y,
    Z,
    G,
    H,
}

impl ParameterType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "S" => Some(ParameterType::S),
            "Y" => Some(ParameterType::Y),
            "Z" => Some(ParameterType::Z),
            "G" => Some(ParameterType::G),
            "H" => Some(ParameterType::H),
            _ => None,
        }
    }
}

/// Contents of the `#` option line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionLine {
    pub unit: FrequencyUnit,
    pub param_type: ParameterType,
    pub format: SParamFormat,
    pub z0: f64,
}

impl Default for OptionLine {
    /// Touchstone defaults: `# GHz S MA R 50`
    fn default() -> Self {
        Self {
            unit: FrequencyUnit::GHz,
            param_type: ParameterType::S,
            format: SParamFormat::MA,
            z0: 50.0,
        }
    }
}

impl OptionLine {
    /// Parse an option line such as `# Hz S RI R 50`
    ///
    /// Tokens may appear in any order; missing tokens keep their defaults.
    pub fn parse(line: &str) -> Result<Self, TouchstoneError> {
        let body = line.trim().strip_prefix('#').ok_or_else(|| {
            TouchstoneError::InvalidOption(format!("missing '#' in {:?}", line))
        })?;
        // Trailing comments are allowed on the option line.
        let body = body.split('!').next().unwrap_or("");

        let mut option = Self::default();
        let mut tokens = body.split_whitespace();

        while let Some(token) = tokens.next() {
            if let Some(unit) = FrequencyUnit::parse(token) {
                option.unit = unit;
            } else if let Some(fmt) = SParamFormat::parse(token) {
                option.format = fmt;
            } else if let Some(pt) = ParameterType::parse(token) {
                option.param_type = pt;
            } else if token.eq_ignore_ascii_case("R") {
                let value = tokens.next().ok_or_else(|| {
                    TouchstoneError::InvalidOption("'R' without reference impedance".to_string())
                })?;
                option.z0 = value.parse().map_err(|_| {
                    TouchstoneError::InvalidOption(format!("bad reference impedance {:?}", value))
                })?;
            } else {
                return Err(TouchstoneError::InvalidOption(format!(
                    "unknown token {:?}",
                    token
                )));
            }
        }

        Ok(option)
    }
}

/// Matrix storage of v2 network data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixFormat {
    #[default]
    Full,
    Lower,
    Upper,
}

/// Parsed Touchstone data
#[derive(Debug, Clone)]
pub struct Touchstone {
    /// Number of ports
    pub nports: usize,
    /// Frequency points
    pub frequency: Frequency,
    /// Parameter data [nfreq, nports, nports], `s[[f, i, j]]` = P(i+1)(j+1)
    pub s: Array3<Complex64>,
    /// Reference impedance per port
    pub z0: Vec<f64>,
    /// Comment lines with the leading `!` removed
    pub comments: Vec<String>,
    /// Value pair format used by the file
    pub format: SParamFormat,
    /// Parameter type declared by the option line
    pub param_type: ParameterType,
    /// True for files carrying a `[Version] 2.x` keyword
    pub is_v2: bool,
}

impl Touchstone {
    /// Parse a Touchstone file; the port count comes from the extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TouchstoneError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(TouchstoneError::InvalidExtension)?;
        let nports = Self::parse_extension(ext)?;

        let reader = BufReader::new(File::open(path)?);
        Self::parse(reader, nports)
    }

    /// Parse from string content
    ///
    /// `nports` is what the extension would have said (`.s2p` = 2); pass 0
    /// for `.ts` content that declares `[Number of Ports]`.
    ///
    /// # Example
    /// ```
    /// use ringres_core::touchstone::Touchstone;
    /// let content = "# GHz S RI R 50\n1.0 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0";
    /// let ts = Touchstone::from_str(content, 2).unwrap();
    /// assert_eq!(ts.nfreq(), 1);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str, nports: usize) -> Result<Self, TouchstoneError> {
        Self::parse(std::io::Cursor::new(content), nports)
    }

    /// Port count from an `sNp` extension; `ts` defers to the file
    fn parse_extension(ext: &str) -> Result<usize, TouchstoneError> {
        let ext = ext.to_lowercase();
        if ext == "ts" {
            return Ok(0);
        }
        ext.strip_prefix('s')
            .and_then(|rest| rest.strip_suffix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .ok_or(TouchstoneError::InvalidExtension)
    }

    fn parse<R: BufRead>(reader: R, nports_hint: usize) -> Result<Self, TouchstoneError> {
        let mut state = ParserState::new(nports_hint);

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            state.line_no = idx + 1;
            if state.finished {
                break;
            }
            state.feed_line(line.trim())?;
        }

        state.finalize()
    }

    /// Number of frequency points
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }
}

struct ParserState {
    nports: usize,
    option: OptionLine,
    option_parsed: bool,
    matrix_format: MatrixFormat,
    z0: Vec<f64>,
    expecting_reference: bool,
    comments: Vec<String>,

    is_v2: bool,
    in_network_data: bool,
    // 2-port column order S11 S21 S12 S22; v1 always uses it.
    two_port_21_12: bool,
    finished: bool,
    line_no: usize,

    frequencies: Vec<f64>,
    points: Vec<Vec<Complex64>>,
    pending: Vec<f64>,
}

impl ParserState {
    fn new(nports: usize) -> Self {
        Self {
            nports,
            option: OptionLine::default(),
            option_parsed: false,
            matrix_format: MatrixFormat::Full,
            z0: Vec::new(),
            expecting_reference: false,
            comments: Vec::new(),
            is_v2: false,
            in_network_data: false,
            two_port_21_12: true,
            finished: false,
            line_no: 0,
            frequencies: Vec::new(),
            points: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn parse_error(&self, message: impl Into<String>) -> TouchstoneError {
        TouchstoneError::Parse {
            line: self.line_no,
            message: message.into(),
        }
    }

    fn feed_line(&mut self, line: &str) -> Result<(), TouchstoneError> {
        if line.is_empty() {
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix('!') {
            self.comments.push(comment.trim().to_string());
            return Ok(());
        }

        if line.starts_with('[') {
            return self.parse_keyword(line);
        }

        if line.starts_with('#') {
            // Only the first option line counts.
            if !self.option_parsed {
                self.option = OptionLine::parse(line)?;
                self.option_parsed = true;
            }
            return Ok(());
        }

        if self.expecting_reference {
            self.push_reference_values(line.split_whitespace())?;
            return Ok(());
        }

        if self.is_v2 && !self.in_network_data {
            return Ok(());
        }

        self.parse_data_line(line)
    }

    fn parse_keyword(&mut self, line: &str) -> Result<(), TouchstoneError> {
        let lower = line.to_ascii_lowercase();
        let close = lower
            .find(']')
            .ok_or_else(|| self.parse_error(format!("unterminated keyword {:?}", line)))?;
        let keyword = lower[1..close].trim().to_string();
        let argument = line[close + 1..].split('!').next().unwrap_or("").trim();

        match keyword.as_str() {
            "version" => {
                self.is_v2 = !argument.starts_with('1');
            }
            "number of ports" => {
                self.nports = argument
                    .parse()
                    .map_err(|_| self.parse_error(format!("bad port count {:?}", argument)))?;
            }
            "two-port data order" => {
                if argument.contains("12_21") {
                    self.two_port_21_12 = false;
                } else if argument.contains("21_12") {
                    self.two_port_21_12 = true;
                } else {
                    return Err(self.parse_error(format!("bad data order {:?}", argument)));
                }
            }
            "reference" => {
                self.z0.clear();
                self.push_reference_values(argument.split_whitespace())?;
                self.expecting_reference = self.z0.len() < self.nports;
            }
            "matrix format" => {
                let arg = argument.to_lowercase();
                self.matrix_format = if arg.starts_with("lower") {
                    MatrixFormat::Lower
                } else if arg.starts_with("upper") {
                    MatrixFormat::Upper
                } else {
                    MatrixFormat::Full
                };
            }
            "network data" => self.in_network_data = true,
            "noise data" | "end" => {
                self.in_network_data = false;
                self.finished = true;
            }
            // Informational keywords carry nothing the extraction needs.
            _ => {}
        }
        Ok(())
    }

    fn push_reference_values<'a, I>(&mut self, tokens: I) -> Result<(), TouchstoneError>
    where
        I: Iterator<Item = &'a str>,
    {
        for token in tokens {
            let value = token
                .parse::<f64>()
                .map_err(|_| self.parse_error(format!("bad reference impedance {:?}", token)))?;
            self.z0.push(value);
        }
        if self.z0.len() >= self.nports {
            self.expecting_reference = false;
        }
        Ok(())
    }

    fn values_per_point(&self) -> usize {
        let pairs = match self.matrix_format {
            MatrixFormat::Full => self.nports * self.nports,
            MatrixFormat::Lower | MatrixFormat::Upper => self.nports * (self.nports + 1) / 2,
        };
        1 + 2 * pairs
    }

    fn parse_data_line(&mut self, line: &str) -> Result<(), TouchstoneError> {
        if self.nports == 0 {
            return Err(TouchstoneError::MissingPortCount);
        }

        let data = line.split('!').next().unwrap_or("");
        let mut values = Vec::new();
        for token in data.split_whitespace() {
            let value = token
                .parse::<f64>()
                .map_err(|_| self.parse_error(format!("non-numeric value {:?}", token)))?;
            values.push(value);
        }
        if values.is_empty() {
            return Ok(());
        }

        // v1 2-port files append noise parameters after the network data;
        // that block starts where the frequency stops increasing.
        if self.pending.is_empty() && !self.is_v2 && self.nports == 2 {
            let f = values[0] * self.option.unit.multiplier();
            if self.frequencies.last().is_some_and(|&last| f <= last) {
                tracing::debug!(line = self.line_no, "noise parameter block skipped");
                self.finished = true;
                return Ok(());
            }
        }

        self.pending.extend(values);

        let per_point = self.values_per_point();
        while self.pending.len() >= per_point {
            let chunk: Vec<f64> = self.pending.drain(..per_point).collect();
            self.push_point(&chunk);
        }
        Ok(())
    }

    fn push_point(&mut self, chunk: &[f64]) {
        self.frequencies.push(chunk[0] * self.option.unit.multiplier());

        let n = self.nports;
        let format = self.option.format;
        let mut matrix = vec![Complex64::new(0.0, 0.0); n * n];
        let mut pairs = chunk[1..]
            .chunks_exact(2)
            .map(|p| format.to_complex(p[0], p[1]));

        match self.matrix_format {
            MatrixFormat::Full if n == 2 && self.two_port_21_12 => {
                for &(i, j) in &[(0, 0), (1, 0), (0, 1), (1, 1)] {
                    if let Some(c) = pairs.next() {
                        matrix[i * n + j] = c;
                    }
                }
            }
            MatrixFormat::Full => {
                for (k, c) in pairs.enumerate() {
                    matrix[k] = c;
                }
            }
            MatrixFormat::Lower => {
                for i in 0..n {
                    for j in 0..=i {
                        if let Some(c) = pairs.next() {
                            matrix[i * n + j] = c;
                            matrix[j * n + i] = c;
                        }
                    }
                }
            }
            MatrixFormat::Upper => {
                for i in 0..n {
                    for j in i..n {
                        if let Some(c) = pairs.next() {
                            matrix[i * n + j] = c;
                            matrix[j * n + i] = c;
                        }
                    }
                }
            }
        }

        self.points.push(matrix);
    }

    fn finalize(self) -> Result<Touchstone, TouchstoneError> {
        if self.nports == 0 {
            return Err(TouchstoneError::MissingPortCount);
        }
        if !self.pending.is_empty() {
            return Err(TouchstoneError::IncompleteData(self.pending.len()));
        }

        let n = self.nports;
        let nfreq = self.points.len();
        let s = Array3::from_shape_fn((nfreq, n, n), |(f, i, j)| self.points[f][i * n + j]);

        let z0 = match self.z0.len() {
            len if len == n => self.z0,
            0 => vec![self.option.z0; n],
            _ => vec![self.z0[0]; n],
        };

        Ok(Touchstone {
            nports: n,
            frequency: Frequency::from_hz(self.frequencies, self.option.unit),
            s,
            z0,
            comments: self.comments,
            format: self.option.format,
            param_type: self.option.param_type,
            is_v2: self.is_v2,
        })
    }
}

//! Trigger file loading

use crate::error::{Result, ScriptError};
use crate::trigger::{parse_flags, AttachType, Program, TriggerTemplate};
use fiery_core::Vnum;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of loaded trigger templates
///
/// # Purpose
/// Built once at boot and handed to the engine. Also counts live instances per
/// template so operators can see which triggers are in use.
///
/// # File Format
/// ```text
/// #3000
/// greeter~
/// 0 g 100
/// ~
/// say Hello, %actor.name%!
/// ~
/// $
/// ```
/// Header line: attach type (0 mob, 1 object, 2 room), category flags
/// (decimal or letters), optional numeric argument. The name, text argument
/// and command block each end at a `~`.
#[derive(Debug, Default)]
pub struct TriggerIndex {
    templates: BTreeMap<Vnum, Arc<TriggerTemplate>>,
    /// Key: trigger vnum, Value: live instances
    instances: HashMap<Vnum, usize>,
}

impl TriggerIndex {
    #[inline]
    pub fn new() -> Self {
        tracing::debug!("Creating TriggerIndex");

        Self::default()
    }

    /// Load every `.trg` file in a directory, in file name order
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(dir.as_ref())?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("trg"))
            .collect();
        paths.sort();

        let mut index = Self::new();
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let count = index.parse(&content)?;
            debug!("Loaded {} triggers from {:?}", count, path);
        }
        Ok(index)
    }

    /// Load one trigger file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut index = Self::new();
        let count = index.parse(&content)?;
        debug!("Loaded {} triggers from {:?}", count, path.as_ref());
        Ok(index)
    }

    /// Parse trigger records and add them to the index
    ///
    /// # Returns
    /// Number of templates read
    pub fn parse(&mut self, content: &str) -> Result<usize> {
        let mut reader = RecordReader::new(content);
        let mut count = 0;

        while let Some((line_no, line)) = reader.next_nonblank() {
            let line = line.trim();
            if line.starts_with('$') {
                break;
            }
            let vnum: Vnum = line
                .strip_prefix('#')
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| ScriptError::ParseError {
                    line: line_no,
                    message: format!("expected #<vnum>, found '{}'", line),
                })?;

            let name = reader.tilde_string(vnum)?;
            let template = Self::parse_header(&mut reader, vnum, name.trim())?;
            self.insert(template);
            count += 1;
        }

        Ok(count)
    }

    fn parse_header(reader: &mut RecordReader<'_>, vnum: Vnum, name: &str) -> Result<TriggerTemplate> {
        let (line_no, header) = reader.next_line().ok_or_else(|| ScriptError::ParseError {
            line: reader.line_no,
            message: format!("trigger {} ends before its header", vnum),
        })?;
        let mut fields = header.split_whitespace();
        let attach_type = fields
            .next()
            .and_then(|v| v.parse().ok())
            .and_then(AttachType::from_code)
            .ok_or_else(|| ScriptError::ParseError {
                line: line_no,
                message: format!("trigger {} has a bad attach type: '{}'", vnum, header),
            })?;
        let trigger_type = fields.next().map(parse_flags).unwrap_or(0);
        let narg = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);

        let arglist = reader.tilde_string(vnum)?;
        let commands = reader.tilde_string(vnum)?;

        Ok(TriggerTemplate {
            vnum,
            name: name.to_string(),
            attach_type,
            trigger_type,
            narg,
            arglist: arglist.trim().to_string(),
            program: Arc::new(Program::parse(&commands)),
        })
    }

    /// Add or replace a template
    pub fn insert(&mut self, template: TriggerTemplate) {
        if self.templates.contains_key(&template.vnum) {
            warn!("Trigger {} defined twice, keeping the later one", template.vnum);
        }
        self.templates.insert(template.vnum, Arc::new(template));
    }

    pub fn get(&self, vnum: Vnum) -> Option<&Arc<TriggerTemplate>> {
        self.templates.get(&vnum)
    }

    pub fn contains(&self, vnum: Vnum) -> bool {
        self.templates.contains_key(&vnum)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in vnum order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TriggerTemplate>> {
        self.templates.values()
    }

    /// Live instances of a template
    pub fn instance_count(&self, vnum: Vnum) -> usize {
        self.instances.get(&vnum).copied().unwrap_or(0)
    }

    pub(crate) fn instance_created(&mut self, vnum: Vnum) {
        *self.instances.entry(vnum).or_insert(0) += 1;
    }

    pub(crate) fn instance_dropped(&mut self, vnum: Vnum) {
        if let Some(count) = self.instances.get_mut(&vnum) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Line cursor over a trigger file
struct RecordReader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> RecordReader<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some((self.line_no, line))
    }

    fn next_nonblank(&mut self) -> Option<(usize, &'a str)> {
        loop {
            let (no, line) = self.next_line()?;
            if !line.trim().is_empty() {
                return Some((no, line));
            }
        }
    }

    /// Text up to the next `~`, possibly spanning several lines
    fn tilde_string(&mut self, vnum: Vnum) -> Result<String> {
        let mut out = Vec::new();
        loop {
            let (_, line) = self.next_line().ok_or_else(|| ScriptError::ParseError {
                line: self.line_no,
                message: format!("trigger {}: missing '~' before end of file", vnum),
            })?;
            if let Some(pos) = line.find('~') {
                out.push(&line[..pos]);
                return Ok(out.join("\n"));
            }
            out.push(line);
        }
    }
}

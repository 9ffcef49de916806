use crate::{Error, Result};

/// A parsed property path: dotted names with optional `[n]` index
/// steps, e.g. `order.lines[0].sku`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Prop(String),
    Index(usize),
}

impl Path {
    pub fn parse(src: &str) -> Result<Path> {
        let src = src.trim();
        if src.is_empty() {
            return Err(Error::expression("empty property path"));
        }

        let mut steps = vec![];
        let mut chars = src.chars().peekable();
        let mut name = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if name.is_empty() {
                        return Err(Error::expression(format!("malformed path `{src}`")));
                    }
                    steps.push(Step::Prop(std::mem::take(&mut name)));
                }
                '[' => {
                    if !name.is_empty() {
                        steps.push(Step::Prop(std::mem::take(&mut name)));
                    }
                    let mut digits = String::new();
                    for ch in chars.by_ref() {
                        if ch == ']' {
                            break;
                        }
                        digits.push(ch);
                    }
                    let index: usize = digits
                        .parse()
                        .map_err(|_| Error::expression(format!("malformed index in `{src}`")))?;
                    steps.push(Step::Index(index));
                }
                ch if ch.is_alphanumeric() || ch == '_' || ch == '$' => name.push(ch),
                _ => return Err(Error::expression(format!("malformed path `{src}`"))),
            }
        }

        if !name.is_empty() {
            steps.push(Step::Prop(name));
        }

        if steps.is_empty() {
            return Err(Error::expression(format!("malformed path `{src}`")));
        }

        Ok(Path { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The leading property name, when the path starts with one.
    pub fn root(&self) -> Option<&str> {
        match self.steps.first() {
            Some(Step::Prop(name)) => Some(name),
            _ => None,
        }
    }

    /// The path with its leading step removed.
    pub fn tail(&self) -> Path {
        Path {
            steps: self.steps[1..].to_vec(),
        }
    }

    pub fn is_single(&self) -> bool {
        self.steps.len() == 1
    }
}

impl core::fmt::Display for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Prop(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Step::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let path = Path::parse("name").unwrap();
        assert_eq!(path.steps(), &[Step::Prop("name".to_string())]);
    }

    #[test]
    fn parse_nested_with_index() {
        let path = Path::parse("order.lines[2].sku").unwrap();
        assert_eq!(path.to_string(), "order.lines[2].sku");
        assert_eq!(path.root(), Some("order"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Path::parse("").is_err());
        assert!(Path::parse("a..b").is_err());
        assert!(Path::parse("a[x]").is_err());
    }
}

use super::{ParamValue, Params};
use crate::error::{Error, Result};

/// Renders `template`, replacing each `{name}` with its parameter.
///
/// `{{` and `}}` are literal braces. List parameters are joined with
/// `separator`.
pub(crate) fn render(template: &str, params: &Params, separator: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let start = pos + 1;
                let end = loop {
                    match chars.next() {
                        Some((end, '}')) => break end,
                        Some((_, '{')) | None => {
                            return Err(Error::template(format!(
                                "unbalanced `{{` at byte {pos}"
                            )));
                        }
                        Some(_) => {}
                    }
                };

                let name = &template[start..end];
                if name.is_empty() {
                    return Err(Error::template(format!(
                        "positional placeholder at byte {pos}; placeholders must be named"
                    )));
                }

                match params.get(name) {
                    Some(ParamValue::Scalar(value)) => out.push_str(value),
                    Some(ParamValue::List(values)) => push_joined(&mut out, values, separator),
                    None => {
                        return Err(Error::template(format!(
                            "no parameter supplied for placeholder `{name}`"
                        )));
                    }
                }
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(Error::template(format!(
                        "single `}}` at byte {pos}; use `}}}}` for a literal brace"
                    )));
                }
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

fn push_joined(out: &mut String, values: &[String], separator: &str) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(value);
    }
}

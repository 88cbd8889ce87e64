use anyhow::Result;
use colored::*;
use serde_json::{json, Value};
use validation::ErrorName;

/// How a taxonomy lookup was requested
pub enum Lookup {
    All,
    Code(u16),
    Name(String),
}

/// Print the error taxonomy, or a single entry of it
pub fn execute(lookup: Lookup, format: &str) -> Result<()> {
    let names = match lookup {
        Lookup::All => ErrorName::ALL.to_vec(),
        Lookup::Code(code) => vec![ErrorName::from_code(code)?],
        Lookup::Name(name) => vec![name.to_uppercase().parse::<ErrorName>()?],
    };

    match format {
        "json" => {
            let entries: Vec<Value> = names.iter().map(|name| entry(*name)).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            for name in names {
                println!(
                    "{:>3}  {:<24} {}",
                    name.code().to_string().cyan(),
                    name.as_str().bold(),
                    name.template()
                );
            }
        }
    }

    Ok(())
}

fn entry(name: ErrorName) -> Value {
    json!({
        "code": name.code(),
        "name": name.as_str(),
        "template": name.template(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_shape() {
        assert_eq!(
            entry(ErrorName::Required),
            json!({"code": 3, "name": "REQUIRED", "template": "{} is required."})
        );
    }

    #[test]
    fn test_unknown_lookups_fail() {
        assert!(execute(Lookup::Code(0), "text").is_err());
        assert!(execute(Lookup::Code(34), "text").is_err());
        assert!(execute(Lookup::Name("NOPE".into()), "json").is_err());
    }

    #[test]
    fn test_known_lookups_succeed() {
        assert!(execute(Lookup::Code(33), "json").is_ok());
        assert!(execute(Lookup::Name("not_owner".into()), "text").is_ok());
    }
}

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::TypeError;
use crate::constants::{LEGACY_TIMESTAMP_FORMAT, LIST_SEPARATOR};

/*
Denormalized list fields

ingredients     Rice (200 g),Chicken (1 unit),Salt (1 pinch)
names           Rice,Chicken,Salt
amounts         200 g,1 unit,1 pinch
steps / tags    Boil the rice,Fry the chicken
*/

pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect::<Vec<String>>()
        .join(&LIST_SEPARATOR.to_string())
}

/// Case-folded recipe name used for name search; folds non-ASCII letters too.
pub fn search_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// `quantity unit`, e.g. `200 g`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    pub quantity: i64,
    pub unit: String,
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (quantity, unit) = value.split_once(char::is_whitespace).unwrap_or((value, ""));

        let quantity = quantity
            .parse::<i64>()
            .map_err(|_e| TypeError::new("Invalid syntax; Invalid amount"))?;

        let unit = unit.trim();
        if unit.is_empty() {
            return Err(TypeError::new("Invalid syntax; Invalid unit"));
        }

        Ok(Self {
            quantity,
            unit: unit.to_string(),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit)
    }
}

/// `name (quantity unit)`, the way a recipe lists one ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IngredientLine {
    pub name: String,
    pub amount: Amount,
}

impl IngredientLine {
    pub fn new(name: &str, quantity: i64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: Amount {
                quantity,
                unit: unit.to_string(),
            },
        }
    }
}

impl FromStr for IngredientLine {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, rest) = value
            .split_once('(')
            .ok_or_else(|| TypeError::new("Invalid syntax; Missing amount"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(TypeError::new("Invalid syntax; Missing name"));
        }

        let amount = rest
            .trim()
            .strip_suffix(')')
            .ok_or_else(|| TypeError::new("Invalid syntax; Unclosed amount"))?;

        Ok(Self {
            name: name.to_string(),
            amount: amount.parse()?,
        })
    }
}

impl TryFrom<String> for IngredientLine {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IngredientLine> for String {
    fn from(value: IngredientLine) -> Self {
        value.to_string()
    }
}

impl fmt::Display for IngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.amount)
    }
}

/// Splits `name (amount),...` into the separate `names` and `amounts` lists.
pub fn separate_ingredients(ingredients: &str) -> Result<(String, String), TypeError> {
    let lines = split_list(ingredients)
        .iter()
        .map(|line| line.parse::<IngredientLine>())
        .collect::<Result<Vec<IngredientLine>, TypeError>>()?;

    Ok((
        join_list(lines.iter().map(|line| line.name.to_owned())),
        join_list(lines.iter().map(|line| line.amount.to_string())),
    ))
}

/// Pairs a `names` list with an `amounts` list.
pub fn combine_ingredients(names: &str, amounts: &str) -> Result<Vec<IngredientLine>, TypeError> {
    let names = split_list(names);
    let amounts = split_list(amounts);

    if names.len() != amounts.len() {
        return Err(TypeError::new("Ingredient and amount counts differ"));
    }

    names
        .into_iter()
        .zip(amounts.iter())
        .map(|(name, amount)| {
            Ok(IngredientLine {
                name,
                amount: amount.parse()?,
            })
        })
        .collect()
}

pub fn format_minutes(minutes: i64) -> String {
    format!("{minutes} min")
}

/// Accepts `30 min` as well as a bare `30`.
pub fn parse_minutes(value: &str) -> Result<i64, TypeError> {
    let value = value.trim();
    let value = value.strip_suffix("min").unwrap_or(value).trim();

    value
        .parse::<i64>()
        .map_err(|_e| TypeError::new("Invalid amount of minutes"))
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LEGACY_TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TypeError> {
    NaiveDateTime::parse_from_str(value.trim(), LEGACY_TIMESTAMP_FORMAT)
        .map_err(|_e| TypeError::new("Invalid timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_drop_blank_items() {
        assert_eq!(split_list(" rice , ,salt,"), vec!["rice", "salt"]);
        assert_eq!(join_list(["rice", " ", "salt "]), "rice,salt");
        assert!(split_list("").is_empty());
    }

    #[test]
    fn search_keys_fold_accented_capitals() {
        assert_eq!(search_key(" Ñoquis de papa "), "ñoquis de papa");
        assert_eq!(search_key("ÁRROZ con leche"), "árroz con leche");
    }

    #[test]
    fn ingredient_lines_parse_and_print() {
        let line: IngredientLine = "Olive oil (2 tbsp)".parse().unwrap();
        assert_eq!(line, IngredientLine::new("Olive oil", 2, "tbsp"));
        assert_eq!(line.to_string(), "Olive oil (2 tbsp)");

        let line: IngredientLine = "Flour ( 500  g )".parse().unwrap();
        assert_eq!(line.amount.unit, "g");
        assert_eq!(line.amount.quantity, 500);
    }

    #[test]
    fn malformed_ingredient_lines_are_rejected() {
        assert!("Flour".parse::<IngredientLine>().is_err());
        assert!("Flour (some g)".parse::<IngredientLine>().is_err());
        assert!("Flour (500 g".parse::<IngredientLine>().is_err());
        assert!("(500 g)".parse::<IngredientLine>().is_err());
        assert!("Flour (500)".parse::<IngredientLine>().is_err());
    }

    #[test]
    fn ingredient_lists_separate_into_names_and_amounts() {
        let (names, amounts) =
            separate_ingredients("Rice (200 g),Chicken (1 unit), Salt (1 pinch)").unwrap();
        assert_eq!(names, "Rice,Chicken,Salt");
        assert_eq!(amounts, "200 g,1 unit,1 pinch");

        let lines = combine_ingredients(&names, &amounts).unwrap();
        assert_eq!(lines[1], IngredientLine::new("Chicken", 1, "unit"));

        assert!(combine_ingredients("Rice,Salt", "200 g").is_err());
    }

    #[test]
    fn ingredient_lines_serialize_as_strings() {
        let line = IngredientLine::new("Garlic", 2, "clove");
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, "\"Garlic (2 clove)\"");

        let back: IngredientLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn minutes_and_timestamps() {
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(parse_minutes("45 min"), Ok(45));
        assert_eq!(parse_minutes("7"), Ok(7));
        assert!(parse_minutes("soon").is_err());

        let timestamp = parse_timestamp("18:05 21-03-2023").unwrap();
        assert_eq!(format_timestamp(&timestamp), "18:05 21-03-2023");
    }
}

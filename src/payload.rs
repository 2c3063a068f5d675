use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Error, Result, PER_PAGE};

const YEAR_FILTER: usize = 0;
const POSITION_FILTER: usize = 1;

/// Where the request body of every page comes from.
///
/// The template is read from disk again for every page, so it can be swapped
/// between runs without touching the code.
#[derive(Debug, Clone)]
pub struct PayloadSource {
    template_path: PathBuf,
    per_page: u64,
}

impl PayloadSource {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        PayloadSource {
            template_path: template_path.into(),
            per_page: PER_PAGE,
        }
    }

    /// Reads the template and fills it in for a single page.
    pub async fn payload(&self, page: u64, year: &str, position: &str) -> Result<Value> {
        let template = load_template(&self.template_path).await?;
        build_payload(template, page, self.per_page, year, position)
    }
}

/// Reads and parses the payload template.
pub async fn load_template(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&raw)
        .map_err(|e| Error::Structure(format!("{} is not valid JSON: {e}", path.display())))
}

/// Sets the paging fields and the year and position filters on `template`.
///
/// `filters[0]` is always the year filter and `filters[1]` the position filter.
/// Everything else in the template is left as it is.
pub fn build_payload(
    mut template: Value,
    page: u64,
    per_page: u64,
    year: &str,
    position: &str,
) -> Result<Value> {
    let root = template
        .as_object_mut()
        .ok_or_else(|| Error::Structure("the template root is not an object".into()))?;

    let filters = root
        .get_mut("filters")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::Structure("missing `filters` list".into()))?;
    if filters.len() <= POSITION_FILTER {
        return Err(Error::Structure(format!(
            "`filters` needs at least 2 entries, found {}",
            filters.len()
        )));
    }
    set_filter_value(filters, YEAR_FILTER, year)?;
    set_filter_value(filters, POSITION_FILTER, position)?;

    root.insert("page".into(), page.into());
    root.insert("perPage".into(), per_page.into());

    Ok(template)
}

#[inline]
fn set_filter_value(filters: &mut [Value], idx: usize, value: &str) -> Result<()> {
    let filter = filters[idx]
        .as_object_mut()
        .ok_or_else(|| Error::Structure(format!("filters[{idx}] is not an object")))?;
    filter.insert("value".into(), value.into());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn template() -> Value {
        json!({
            "page": 0,
            "perPage": 10,
            "filters": [
                { "field": "anio", "operator": "eq", "value": "" },
                { "field": "posicion", "operator": "eq", "value": "" },
                { "field": "aduana", "operator": "eq", "value": "ASUNCION" }
            ],
            "sort": [{ "field": "fecha", "dir": "desc" }],
            "grid": "importaciones"
        })
    }

    #[test]
    fn fills_in_page_and_filters() {
        let payload = build_payload(template(), 3, PER_PAGE, "2023", "3101.00.00").unwrap();

        assert_eq!(payload["page"], 3);
        assert_eq!(payload["perPage"], 1000);
        assert_eq!(payload["filters"][0]["value"], "2023");
        assert_eq!(payload["filters"][1]["value"], "3101.00.00");
    }

    #[test]
    fn keeps_the_rest_of_the_template() {
        let source = template();
        let payload = build_payload(source.clone(), 1, PER_PAGE, "2023", "3102.00.00").unwrap();

        assert_eq!(payload["filters"][0]["field"], source["filters"][0]["field"]);
        assert_eq!(payload["filters"][1]["operator"], source["filters"][1]["operator"]);
        assert_eq!(payload["filters"][2], source["filters"][2]);
        assert_eq!(payload["sort"], source["sort"]);
        assert_eq!(payload["grid"], source["grid"]);

        let keys: Vec<_> = payload.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["page", "perPage", "filters", "sort", "grid"]);
    }

    #[test]
    fn same_arguments_same_payload() {
        let a = build_payload(template(), 2, PER_PAGE, "2023", "3103.00.00").unwrap();
        let b = build_payload(template(), 2, PER_PAGE, "2023", "3103.00.00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_filters_is_a_structure_error() {
        let res = build_payload(json!({ "page": 1 }), 1, PER_PAGE, "2023", "3101.00.00");
        assert!(matches!(res, Err(Error::Structure(_))));
    }

    #[test]
    fn short_filters_is_a_structure_error() {
        let short = json!({ "filters": [{ "field": "anio", "value": "" }] });
        let res = build_payload(short, 1, PER_PAGE, "2023", "3101.00.00");
        assert!(matches!(res, Err(Error::Structure(_))));
    }

    #[test]
    fn non_object_filter_is_a_structure_error() {
        let bad = json!({ "filters": [{ "value": "" }, "posicion"] });
        let res = build_payload(bad, 1, PER_PAGE, "2023", "3101.00.00");
        assert!(matches!(res, Err(Error::Structure(_))));
    }

    #[tokio::test]
    async fn source_rereads_the_template_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", template()).unwrap();
        let source = PayloadSource::new(file.path());

        let first = source.payload(1, "2023", "3104.00.00").await.unwrap();
        assert_eq!(first["grid"], "importaciones");

        let mut changed = template();
        changed["grid"] = json!("exportaciones");
        std::fs::write(file.path(), changed.to_string()).unwrap();

        let second = source.payload(2, "2023", "3104.00.00").await.unwrap();
        assert_eq!(second["grid"], "exportaciones");
        assert_eq!(second["page"], 2);
    }

    #[tokio::test]
    async fn missing_template_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = PayloadSource::new(dir.path().join("nope.json"));

        let res = source.payload(1, "2023", "3101.00.00").await;
        assert!(matches!(res, Err(Error::Storage { .. })));
    }

    #[tokio::test]
    async fn invalid_json_template_is_a_structure_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let res = load_template(file.path()).await;
        assert!(matches!(res, Err(Error::Structure(_))));
    }

    #[tokio::test]
    async fn bundled_template_has_both_filters() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::DEFAULT_TEMPLATE_PATH);
        let template = load_template(&path).await.unwrap();

        let payload = build_payload(template, 1, PER_PAGE, "2023", "3105.00.00").unwrap();
        assert_eq!(payload["filters"][1]["value"], "3105.00.00");
    }
}

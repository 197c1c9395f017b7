use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::graph::Dag;

impl Dag {
    /// Serialize the network, including levels and parameter models.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a network and re-validate its structural invariants,
    /// since the bytes did not come through the mutation API.
    pub fn from_json(json: &str) -> Result<Self> {
        let dag: Dag = serde_json::from_str(json)?;
        dag.validate()?;
        Ok(dag)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_preserves_structure_and_parameters() {
        let mut dag = Dag::from_modelstring("[A][B|A]").unwrap();
        dag.generate_discrete_parameters(None, None, None, true, Some(5))
            .unwrap();
        let json = dag.to_json().unwrap();
        let restored = Dag::from_json(&json).unwrap();
        assert_eq!(dag, restored);
        assert_eq!(dag.levels("B").unwrap(), restored.levels("B").unwrap());
        assert_eq!(
            dag.cpd("B").unwrap().unwrap().as_table().unwrap().probabilities(),
            restored
                .cpd("B")
                .unwrap()
                .unwrap()
                .as_table()
                .unwrap()
                .probabilities()
        );
    }

    #[test]
    fn test_from_json_rejects_cyclic_structure() {
        let cyclic = r#"{
            "vertices": [
                {"name": "A", "levels": null, "cpd": null},
                {"name": "B", "levels": null, "cpd": null}
            ],
            "parents": [[1], [0]],
            "children": [[1], [0]]
        }"#;
        assert!(Dag::from_json(cyclic).is_err());
    }
}

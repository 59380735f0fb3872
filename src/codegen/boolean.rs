use crate::error::SchemaError;
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

#[derive(Debug, Clone)]
pub struct BoolGenerator {
    pub default: Option<bool>,
}

impl BoolGenerator {
    pub fn new(node: &SchemaNode) -> Result<Self, SchemaError> {
        Ok(Self { default: node.bool("default")? })
    }

    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        if let Some(default) = self.default {
            out.print(format!("{lvalue} = {default};"));
        }
    }
}

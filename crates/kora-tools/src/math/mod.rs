//! Math agent: integer arithmetic, expression evaluation, unit conversion
//! and matrix operations. Runs locally with no remote service.

mod expr;
mod matrix;
mod units;

use async_trait::async_trait;
use kora_llm::ToolDefinition;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::tool::{Tool, ToolKind, ToolRequest};

pub use expr::{evaluate, round_significant};
pub use matrix::Matrix;
pub use units::{convert, UnitType};

/// Significant digits reported by `calculate` unless the caller asks otherwise
pub const DEFAULT_PRECISION: u32 = 10;

#[derive(Deserialize)]
struct IntPair {
    a: i64,
    b: i64,
}

#[derive(Deserialize)]
struct CalculateArgs {
    expression: String,
    #[serde(default = "default_precision")]
    precision: u32,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

#[derive(Deserialize)]
struct ConvertArgs {
    value: f64,
    from_unit: String,
    to_unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MatrixOperation {
    Determinant,
    Inverse,
    Transpose,
    Add,
    Multiply,
}

#[derive(Deserialize)]
struct MatrixArgs {
    matrix_a: Vec<Vec<f64>>,
    operation: MatrixOperation,
    #[serde(default)]
    matrix_b: Option<Vec<Vec<f64>>>,
}

/// Local math agent
#[derive(Debug, Clone, Default)]
pub struct MathTool;

impl MathTool {
    /// Create the math agent
    pub fn new() -> Self {
        Self
    }

    fn add(&self, request: &ToolRequest) -> ToolResult<String> {
        let IntPair { a, b } = request.parse()?;
        a.checked_add(b)
            .map(|sum| sum.to_string())
            .ok_or_else(|| ToolError::computation("integer overflow"))
    }

    fn multiply(&self, request: &ToolRequest) -> ToolResult<String> {
        let IntPair { a, b } = request.parse()?;
        a.checked_mul(b)
            .map(|product| product.to_string())
            .ok_or_else(|| ToolError::computation("integer overflow"))
    }

    fn calculate(&self, request: &ToolRequest) -> ToolResult<String> {
        let args: CalculateArgs = request.parse()?;
        let precision = args.precision.clamp(1, 15);
        let value = evaluate(&args.expression)?;
        debug!(expression = %args.expression, value, "Evaluated expression");

        Ok(json!({
            "expression": args.expression,
            "result": round_significant(value, precision),
            "type": "numerical",
        })
        .to_string())
    }

    fn convert_units(&self, request: &ToolRequest) -> ToolResult<String> {
        let args: ConvertArgs = request.parse()?;
        let (converted, unit_type) = convert(args.value, &args.from_unit, &args.to_unit)
            .ok_or_else(|| {
                ToolError::invalid(
                    &request.function,
                    format!(
                        "conversion from {} to {} not supported; supported: {}",
                        args.from_unit,
                        args.to_unit,
                        units::supported().join(", ")
                    ),
                )
            })?;

        Ok(json!({
            "original_value": args.value,
            "original_unit": args.from_unit,
            "converted_value": round_significant(converted, DEFAULT_PRECISION),
            "converted_unit": args.to_unit,
            "unit_type": unit_type,
        })
        .to_string())
    }

    fn matrix_operations(&self, request: &ToolRequest) -> ToolResult<String> {
        let args: MatrixArgs = request.parse()?;
        let operation = args.operation_name();
        let a = Matrix::new(args.matrix_a, "matrix_a")?;
        let second = |b: Option<Vec<Vec<f64>>>| -> ToolResult<Matrix> {
            let rows = b.ok_or_else(|| {
                ToolError::invalid(&request.function, "matrix_b is required for add and multiply")
            })?;
            Matrix::new(rows, "matrix_b")
        };

        let result = match args.operation {
            MatrixOperation::Determinant => {
                json!(round_significant(a.determinant()?, DEFAULT_PRECISION))
            }
            MatrixOperation::Inverse => rounded(a.inverse()?),
            MatrixOperation::Transpose => rounded(a.transpose()),
            MatrixOperation::Add => rounded(a.add(&second(args.matrix_b)?)?),
            MatrixOperation::Multiply => rounded(a.multiply(&second(args.matrix_b)?)?),
        };

        Ok(json!({
            "operation": operation,
            "result": result,
        })
        .to_string())
    }
}

impl MatrixArgs {
    fn operation_name(&self) -> &'static str {
        match self.operation {
            MatrixOperation::Determinant => "determinant",
            MatrixOperation::Inverse => "inverse",
            MatrixOperation::Transpose => "transpose",
            MatrixOperation::Add => "add",
            MatrixOperation::Multiply => "multiply",
        }
    }
}

fn rounded(matrix: Matrix) -> serde_json::Value {
    let rows: Vec<Vec<f64>> = matrix
        .into_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|x| round_significant(x, DEFAULT_PRECISION))
                .collect()
        })
        .collect();
    json!(rows)
}

#[async_trait]
impl Tool for MathTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Math
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let pair = json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        });
        let matrix = json!({
            "type": "array",
            "items": { "type": "array", "items": { "type": "number" } }
        });

        vec![
            ToolDefinition::function("add", "Add two integers together", pair.clone()),
            ToolDefinition::function("multiply", "Multiply two integers together", pair),
            ToolDefinition::function(
                "calculate",
                "Evaluate an arithmetic expression such as \"2+2\", \"sin(pi/2)\" or \"sqrt(16)\". \
                 Supports + - * / % ^, parentheses, pi, e and sqrt sin cos tan ln log abs exp.",
                json!({
                    "type": "object",
                    "properties": {
                        "expression": { "type": "string", "description": "Expression to evaluate" },
                        "precision": {
                            "type": "integer",
                            "description": "Significant digits in the result (default 10)",
                            "default": DEFAULT_PRECISION
                        }
                    },
                    "required": ["expression"]
                }),
            ),
            ToolDefinition::function(
                "convert_units",
                "Convert a value between units of length (km, miles, m, ft, cm, inch), \
                 weight (kg, lb, g, oz), volume (l, gal, ml, floz) or temperature \
                 (celsius, fahrenheit, kelvin)",
                json!({
                    "type": "object",
                    "properties": {
                        "value": { "type": "number" },
                        "from_unit": { "type": "string" },
                        "to_unit": { "type": "string" }
                    },
                    "required": ["value", "from_unit", "to_unit"]
                }),
            ),
            ToolDefinition::function(
                "matrix_operations",
                "Matrix determinant, inverse, transpose, add or multiply",
                json!({
                    "type": "object",
                    "properties": {
                        "matrix_a": matrix.clone(),
                        "operation": {
                            "type": "string",
                            "enum": ["determinant", "inverse", "transpose", "add", "multiply"]
                        },
                        "matrix_b": matrix
                    },
                    "required": ["matrix_a", "operation"]
                }),
            ),
        ]
    }

    async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        match request.function.as_str() {
            "add" => self.add(&request),
            "multiply" => self.multiply(&request),
            "calculate" => self.calculate(&request),
            "convert_units" => self.convert_units(&request),
            "matrix_operations" => self.matrix_operations(&request),
            _ => Err(request.unknown()),
        }
    }
}

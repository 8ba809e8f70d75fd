//! System prompts for the two remote calls.

/// Condition assessment of one component image.
pub const ASSESSMENT_PROMPT: &str = "\
Identify the type of industrial mechanical component shown in the image, \
grade its condition, describe the condition, and provide maintenance \
recommendations.

# Steps

1. **Identify Component Type**: Be as specific as possible, e.g. \
'Vented Gas Furnace' rather than 'HVAC System'.
2. **Assess Condition**: Grade the component 'Poor', 'Fair', or 'Good':
   - Poor: below standard, should be replaced or overhauled.
   - Fair: average condition, action required soon but not immediately.
   - Good: above average, no action needed.
3. **Describe Condition**: Detail the current physical state and any \
visible defects.
4. **Maintenance Recommendations**: Suggest the actions or repairs needed \
to keep the component in compliance with safety and operational codes.

# Output Format

A JSON object:
{
  \"component_type\": \"string\",
  \"condition_grade\": \"Poor\" | \"Fair\" | \"Good\",
  \"condition_description\": \"string\",
  \"maintenance_recommendations\": \"string\"
}

# Notes

- Base the grade and recommendations on visible attributes only.
- For components with severe issues, prioritize safety.
- If a red drawing is overlaid on the image, focus your assessment \
exclusively on the annotated region.

IMPORTANT: if the image is itself a red drawing with no distinguishable \
component behind it, ignore the other instructions and output 'DRAWING' \
as the condition grade.";

/// Report introduction and summary from the full result set.
pub const REPORT_PROMPT: &str = "\
Prepare a building condition assessment report introduction and summary \
as full paragraphs, in JSON.

The introduction must state the address and give a comprehensive overview \
of the essential components, their conditions, and key recommendations. \
The summary must encapsulate the entire assessment with fresh insights: \
the overall condition and any major follow-up actions required, without \
repeating the introduction verbatim.

# Output Format

{
  \"introduction\": \"Detailed paragraph covering all major observed points.\",
  \"summary\": \"Comprehensive paragraph with a broad overview and suggested actions.\"
}";

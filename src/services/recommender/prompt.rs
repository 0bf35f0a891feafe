use serde::Serialize;

use crate::models::{ProductFilters, ScoredProduct};

/// Reduced product record sent to the recommender to keep requests small
#[derive(Debug, Serialize)]
struct PromptProduct<'a> {
    product_id: &'a str,
    title: &'a str,
    category: &'a str,
    subcategory: &'a str,
    price: f64,
    color: Option<&'a str>,
}

impl<'a> From<&ScoredProduct<'a>> for PromptProduct<'a> {
    fn from(scored: &ScoredProduct<'a>) -> Self {
        let product = scored.product;
        Self {
            product_id: &product.product_id,
            title: &product.title,
            category: &product.category_name,
            subcategory: &product.subcategory_name,
            price: product.price,
            color: product.color.as_deref(),
        }
    }
}

/// Builds the ranking request for the external recommender
pub fn build_prompt(
    query: &str,
    filters: &ProductFilters,
    candidates: &[ScoredProduct<'_>],
) -> Result<String, serde_json::Error> {
    let products: Vec<PromptProduct<'_>> = candidates.iter().map(PromptProduct::from).collect();
    let catalog = serde_json::to_string_pretty(&products)?;

    let filter_line = if filters.is_empty() {
        String::new()
    } else {
        format!("\nApplied Filters: {}", filters)
    };

    Ok(format!(
        r#"You are a product recommendation expert. Based on the user's search query and filters, recommend the most relevant products from the available catalog.

Search Query: "{query}"{filter_line}

Available Products (JSON format - already pre-filtered for relevance):
{catalog}

Instructions:
1. Analyze the user's search query and understand their intent
2. The products provided have ALREADY been filtered by color and price range
3. Match products based on RELEVANCE to the search query, not just the filters
4. RANK products by relevance - the MOST RELEVANT products must come FIRST
5. Consider title, category and subcategory when determining relevance
6. The TOP 5 products in your response will be marked as "HIGHLY RECOMMENDED"
7. Return ONLY a JSON array of product_id strings for up to 20 of the most relevant products
8. Order matters: put the best matches first

Example Output Format (ordered by relevance):
["PROD001", "PROD002", "PROD003"]

Your Response (JSON array only, ordered from most to least relevant):"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    fn scored(products: &[Product]) -> Vec<ScoredProduct<'_>> {
        products
            .iter()
            .map(|product| ScoredProduct {
                product,
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_prompt_embeds_query_and_simplified_products() {
        let products = vec![
            Product::new("SHOE001", "Premium Shoes Series 3", "Fashion", "Footwear", 45.0)
                .with_color("Red"),
            Product::new("BAG002", "Canvas Tote", "Fashion", "Bags", 20.0),
        ];

        let prompt = build_prompt("red shoes", &ProductFilters::default(), &scored(&products)).unwrap();

        assert!(prompt.contains(r#"Search Query: "red shoes""#));
        assert!(prompt.contains(r#""product_id": "SHOE001""#));
        assert!(prompt.contains(r#""subcategory": "Footwear""#));
        assert!(prompt.contains(r#""color": "Red""#));
        assert!(prompt.contains(r#""color": null"#));
        assert!(!prompt.contains("Applied Filters"));
        assert!(prompt.contains("up to 20"));
    }

    #[test]
    fn test_prompt_includes_filter_summary() {
        let products = vec![Product::new("P1", "Lamp", "Home", "Lighting", 10.0)];
        let filters = ProductFilters {
            color: Some("Red".to_string()),
            min_price: None,
            max_price: Some(100.0),
        };

        let prompt = build_prompt("lamp", &filters, &scored(&products)).unwrap();
        assert!(prompt.contains(r#"Applied Filters: color="Red", maxPrice=100"#));
    }

    #[test]
    fn test_prompt_product_list_is_valid_json() {
        let products = vec![Product::new("P1", "Lamp \"Lux\"", "Home", "Lighting", 10.0)];
        let prompt = build_prompt("lamp", &ProductFilters::default(), &scored(&products)).unwrap();

        let start = prompt.find("[\n").unwrap();
        let end = prompt.find("\n]").unwrap() + 2;
        let parsed: serde_json::Value = serde_json::from_str(&prompt[start..end]).unwrap();
        assert_eq!(parsed[0]["title"], "Lamp \"Lux\"");
        assert_eq!(parsed[0]["price"], 10.0);
    }
}

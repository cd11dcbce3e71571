use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Top-level complaint classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "complaint_category")]
pub enum Category {
    Electrical,
    Plumbing,
    Security,
    Appliances,
    Housekeeping,
    Medical,
    Carpentry,
    Community,
    Laundry,
    #[sqlx(rename = "Repairs & Maintenance")]
    #[serde(rename = "Repairs & Maintenance")]
    RepairsAndMaintenance,
    #[sqlx(rename = "Food & Beverage")]
    #[serde(rename = "Food & Beverage")]
    FoodAndBeverage,
    #[sqlx(rename = "Internet & Connection")]
    #[serde(rename = "Internet & Connection")]
    InternetAndConnection,
    Others,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Electrical,
        Category::Plumbing,
        Category::Security,
        Category::Appliances,
        Category::Housekeeping,
        Category::Medical,
        Category::Carpentry,
        Category::Community,
        Category::Laundry,
        Category::RepairsAndMaintenance,
        Category::FoodAndBeverage,
        Category::InternetAndConnection,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electrical => "Electrical",
            Category::Plumbing => "Plumbing",
            Category::Security => "Security",
            Category::Appliances => "Appliances",
            Category::Housekeeping => "Housekeeping",
            Category::Medical => "Medical",
            Category::Carpentry => "Carpentry",
            Category::Community => "Community",
            Category::Laundry => "Laundry",
            Category::RepairsAndMaintenance => "Repairs & Maintenance",
            Category::FoodAndBeverage => "Food & Beverage",
            Category::InternetAndConnection => "Internet & Connection",
            Category::Others => "Others",
        }
    }

    /// Allowed subcategories, in display order.
    pub fn subcategories(&self) -> &'static [&'static str] {
        match self {
            Category::Electrical => &[
                "Powercut",
                "Fan regulator",
                "Tube light",
                "Socket",
                "Switch",
                "Fan",
                "Others",
            ],
            Category::Plumbing => &["Tap", "Shower", "Flush", "Washbasin", "Geyser", "Others"],
            Category::Security => &["CCTV not working", "Theft", "Others"],
            Category::Appliances => &[
                "TV",
                "Washing Machine",
                "Fridge",
                "Microwave",
                "Induction",
                "Others",
            ],
            Category::Housekeeping => &["Pest Control", "Garbage", "Utensils", "Cleaning", "Others"],
            Category::Medical => &["Doctor", "Others"],
            Category::Carpentry => &[
                "Window",
                "Door",
                "Cupboard",
                "Study Table",
                "Chair",
                "Bed & Mattress",
                "Others",
            ],
            Category::Community => &["Neighbourhood", "Roommate", "Staff"],
            Category::Laundry => &["Washing", "Delivery", "Pickup", "Iron"],
            Category::RepairsAndMaintenance => &["Paint", "Lock", "Others"],
            Category::FoodAndBeverage => &["Menu", "Food", "Others"],
            Category::InternetAndConnection => &["Network Booster", "DTH", "WiFi"],
            Category::Others => &["Others"],
        }
    }

    pub fn allows(&self, subcategory: &str) -> bool {
        self.subcategories().contains(&subcategory)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// The fixed category → subcategories table, serialized as an ordered JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryCatalog;

impl Serialize for CategoryCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for category in Category::ALL {
            map.serialize_entry(category.as_str(), category.subcategories())?;
        }
        map.end()
    }
}

// 📚 Standard Catalog - Declarative category/subcategory data
// Declaration order matters: the first subcategory of a category is its primary one,
// and the reference text lists categories in this order.

use super::{CategoryDefinition, CategoryType, SubcategoryDefinition};

pub const DEFAULT_CATEGORY_ID: &str = "others";
pub const DEFAULT_SUBCATEGORY_ID: &str = "others:missing";

const CATEGORIES: &[(&str, &str, &str, &str, CategoryType)] = &[
    // id, name, color, icon, type
    ("foodAndDrinks", "Food & Drinks", "#F97316", "silverware-fork-knife", CategoryType::Expense),
    ("shopping", "Shopping", "#A855F7", "shopping", CategoryType::Expense),
    ("housing", "Housing", "#EF4444", "home-variant-outline", CategoryType::Expense),
    ("transportation", "Transportation", "#0EA5E9", "bus", CategoryType::Expense),
    ("vehicle", "Vehicle", "#22C55E", "car", CategoryType::Expense),
    ("lifeEntertainment", "Life & Entertainment", "#EC4899", "party-popper", CategoryType::Expense),
    ("communicationPc", "Communication, PC", "#6366F1", "cellphone", CategoryType::Expense),
    ("financialExpenses", "Financial Expenses", "#F59E0B", "bank-outline", CategoryType::Expense),
    ("investments", "Investments", "#10B981", "chart-line", CategoryType::Expense),
    ("others", "Others", "#9CA3AF", "dots-horizontal-circle", CategoryType::Expense),
    ("income", "Income", "#2563EB", "wallet-plus", CategoryType::Income),
];

// id, parent id, name, icon
const SUBCATEGORIES: &[(&str, &str, &str, &str)] = &[
    // foodAndDrinks
    ("foodAndDrinks:bar-cafe", "foodAndDrinks", "Bar, Cafe", "coffee-outline"),
    ("foodAndDrinks:groceries", "foodAndDrinks", "Groceries", "cart-outline"),
    ("foodAndDrinks:restaurant-fast-food", "foodAndDrinks", "Restaurant, Fast-food", "silverware-fork-knife"),
    // shopping
    ("shopping:clothes-shoes", "shopping", "Clothes & shoes", "tshirt-crew-outline"),
    ("shopping:drug-store-chemist", "shopping", "Drug-store, chemist", "pill"),
    ("shopping:electronics-accessories", "shopping", "Electronics, accessories", "cellphone"),
    ("shopping:free-time", "shopping", "Free-time", "puzzle-outline"),
    ("shopping:gifts-joy", "shopping", "Gifts, joy", "gift-outline"),
    ("shopping:health-beauty", "shopping", "Health and beauty", "flower-outline"),
    ("shopping:home-green", "shopping", "Home, green", "leaf"),
    ("shopping:jewels-accessories", "shopping", "Jewels, accessories", "diamond-stone"),
    ("shopping:kids", "shopping", "Kids", "baby-face-outline"),
    ("shopping:pets-animals", "shopping", "Pets, animals", "paw"),
    ("shopping:stationary-tools", "shopping", "Stationary, tools", "pencil-ruler"),
    // housing
    ("housing:energy-utilities", "housing", "Energy, utilities", "flash-outline"),
    ("housing:maintenance-repairs", "housing", "Maintenance, repairs", "hammer-wrench"),
    ("housing:mortgage", "housing", "Mortgage", "office-building-outline"),
    ("housing:property-insurance", "housing", "Property insurance", "shield-home-outline"),
    ("housing:rent", "housing", "Rent", "home-city-outline"),
    ("housing:services", "housing", "Services", "toolbox-outline"),
    // transportation
    ("transportation:business-trips", "transportation", "Business trips", "briefcase-outline"),
    ("transportation:long-distance", "transportation", "Long distance", "airplane"),
    ("transportation:public-transport", "transportation", "Public transport", "bus"),
    ("transportation:taxi", "transportation", "Taxi", "taxi"),
    // vehicle
    ("vehicle:fuel", "vehicle", "Fuel", "gas-station-outline"),
    ("vehicle:leasing", "vehicle", "Leasing", "car-key"),
    ("vehicle:parking", "vehicle", "Parking", "parking"),
    ("vehicle:rentals", "vehicle", "Rentals", "car-arrow-right"),
    ("vehicle:vehicle-insurance", "vehicle", "Vehicle insurance", "shield-car"),
    ("vehicle:vehicle-maintenance", "vehicle", "Vehicle maintenance", "car-wrench"),
    // lifeEntertainment
    ("lifeEntertainment:active-sport-fitness", "lifeEntertainment", "Active sport, fitness", "dumbbell"),
    ("lifeEntertainment:alcohol-tobacco", "lifeEntertainment", "Alcohol, tobacco", "glass-cocktail"),
    ("lifeEntertainment:books-audio-subscriptions", "lifeEntertainment", "Books, audio, subscriptions", "book-open-page-variant"),
    ("lifeEntertainment:charity-gifts", "lifeEntertainment", "Charity, gifts", "hand-heart-outline"),
    ("lifeEntertainment:culture-sport-events", "lifeEntertainment", "Culture, sport events", "ticket-confirmation-outline"),
    ("lifeEntertainment:education-development", "lifeEntertainment", "Education, development", "school-outline"),
    ("lifeEntertainment:health-care-doctor", "lifeEntertainment", "Health care, doctor", "stethoscope"),
    ("lifeEntertainment:hobbies", "lifeEntertainment", "Hobbies", "palette-outline"),
    ("lifeEntertainment:holiday-trips-hotels", "lifeEntertainment", "Holiday, trips, hotels", "beach"),
    ("lifeEntertainment:life-events", "lifeEntertainment", "Life events", "party-popper"),
    ("lifeEntertainment:lottery-gambling", "lifeEntertainment", "Lottery, gambling", "dice-5"),
    ("lifeEntertainment:tv-streaming", "lifeEntertainment", "TV, Streaming", "television-play"),
    ("lifeEntertainment:wellness-beauty", "lifeEntertainment", "Wellness, beauty", "flower-lotus"),
    // communicationPc
    ("communicationPc:internet", "communicationPc", "Internet", "wifi"),
    ("communicationPc:phone-cellphone", "communicationPc", "Phone, cellphone", "cellphone"),
    ("communicationPc:postal-services", "communicationPc", "Postal services", "email-outline"),
    ("communicationPc:software-apps-games", "communicationPc", "Software, apps, games", "controller-classic-outline"),
    // financialExpenses
    ("financialExpenses:advisory", "financialExpenses", "Advisory", "account-tie-outline"),
    ("financialExpenses:charges-fees", "financialExpenses", "Charges, Fees", "cash-multiple"),
    ("financialExpenses:child-support", "financialExpenses", "Child Support", "human-child"),
    ("financialExpenses:fines", "financialExpenses", "Fines", "gavel"),
    ("financialExpenses:insurances", "financialExpenses", "Insurances", "shield-outline"),
    ("financialExpenses:loan-interest", "financialExpenses", "Loan, Interest", "cash-plus"),
    ("financialExpenses:taxes", "financialExpenses", "Taxes", "file-document-outline"),
    // investments
    ("investments:collections", "investments", "Collections", "cube-outline"),
    ("investments:financial-investments", "investments", "Financial investments", "chart-line"),
    ("investments:realty", "investments", "Realty", "home-modern"),
    ("investments:savings", "investments", "Savings", "piggy-bank"),
    ("investments:vehicle-chattels", "investments", "Vehicle, chattels", "garage"),
    // others
    ("others:missing", "others", "Missing", "dots-horizontal-circle-outline"),
    // income
    ("income:checks-coupons", "income", "Checks, coupons", "ticket-percent"),
    ("income:child-support", "income", "Child Support", "human-child"),
    ("income:dues-grants", "income", "Dues & grants", "hand-coin-outline"),
    ("income:gifts", "income", "Gifts", "gift-outline"),
    ("income:interests-dividends", "income", "Interests, dividends", "chart-areaspline"),
    ("income:lending-renting", "income", "Lending, renting", "handshake"),
    ("income:lottery-gambling", "income", "Lottery, Gambling", "dice-5"),
    ("income:refunds", "income", "Refunds (tax, purchase)", "cash-refund"),
    ("income:rental-income", "income", "Rental Income", "home-city-outline"),
    ("income:sale", "income", "Sale", "tag-outline"),
    ("income:wage-invoices", "income", "Wage, invoices", "briefcase-outline"),
];

pub fn standard_categories() -> Vec<CategoryDefinition> {
    CATEGORIES
        .iter()
        .map(|(id, name, color, icon, category_type)| CategoryDefinition {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            category_type: *category_type,
        })
        .collect()
}

pub fn standard_subcategories() -> Vec<SubcategoryDefinition> {
    SUBCATEGORIES
        .iter()
        .map(|(id, parent_id, name, icon)| SubcategoryDefinition {
            id: id.to_string(),
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
        })
        .collect()
}
